//! Command implementations for the utask CLI.

mod list;
mod mode;
mod run;

use crate::cli::{Cli, Command};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::environment::ProcessEnvironment;
use crate::error::Result;
use std::path::Path;

/// Route a parsed command line to its handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => run::cmd_run(&config, args),
        Command::Commands => list::cmd_commands(&config),
        Command::Mode(args) => mode::cmd_mode(&config, args),
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_or_default(DEFAULT_CONFIG_FILE),
    }
}

fn environment(config: &Config) -> ProcessEnvironment {
    ProcessEnvironment::with_overrides(config.environment.clone())
}
