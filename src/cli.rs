//! Command line entry point: `flamelet_core <case.json> [iterations]`
pub mod cli_main;
