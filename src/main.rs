//! Entry point for the `utask` CLI. Parses arguments, installs logging,
//! dispatches to the command handler, and maps errors to exit codes.

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use utask::cli::Cli;
use utask::{commands, exit_codes};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_env("UTASK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
