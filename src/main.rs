use FlameletCore::cli::cli_main::run_cli;

pub fn main() {
    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run_cli(&args) {
        eprintln!("flamelet_core: {}", e);
        std::process::exit(1);
    }
}
