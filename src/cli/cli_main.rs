use crate::FlameletSolver::case_parser::CaseDescription;
use crate::FlameletSolver::flamelet_errors::FlameletError;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

const USAGE: &str = "usage: flamelet_core <case.json> [iterations]";

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub case_path: String,
    /// overrides `iterations` of the case file
    pub iterations: Option<usize>,
}

impl CliArgs {
    /// `args[0]` is the program name
    pub fn parse(args: &[String]) -> Result<Self, FlameletError> {
        let case_path = args
            .get(1)
            .ok_or_else(|| FlameletError::MissingData(USAGE.to_string()))?
            .clone();
        let iterations = match args.get(2) {
            Some(n) => Some(n.parse::<usize>().map_err(|_| {
                FlameletError::InvalidConfiguration(format!(
                    "iterations must be a non-negative integer, got {}\n{}",
                    n, USAGE
                ))
            })?),
            None => None,
        };
        Ok(Self {
            case_path,
            iterations,
        })
    }
}

fn init_logging() {
    // a logger may already be installed by an embedding application
    let _ = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}

pub fn run_cli(args: &[String]) -> Result<(), FlameletError> {
    let cli = CliArgs::parse(args)?;
    init_logging();
    let case = CaseDescription::from_file(&cli.case_path)?;
    let iterations = cli.iterations.unwrap_or(case.iterations);
    let mut solver = case.build_solver()?;
    solver.pretty_print_case();
    info!("running {} iterations", iterations);
    let summary = solver.run(iterations);
    solver.print_field_ranges();
    summary.pretty_print();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use crate::FlameletSolver::flamelet_errors::FlameletError;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let cli = CliArgs::parse(&args(&["flamelet_core", "case.json", "25"])).unwrap();
        assert_eq!(cli.case_path, "case.json");
        assert_eq!(cli.iterations, Some(25));
        let cli = CliArgs::parse(&args(&["flamelet_core", "case.json"])).unwrap();
        assert_eq!(cli.iterations, None);
    }

    #[test]
    fn test_parse_bad_args() {
        assert!(matches!(
            CliArgs::parse(&args(&["flamelet_core"])),
            Err(FlameletError::MissingData(_))
        ));
        assert!(matches!(
            CliArgs::parse(&args(&["flamelet_core", "case.json", "-3"])),
            Err(FlameletError::InvalidConfiguration(_))
        ));
    }
}
