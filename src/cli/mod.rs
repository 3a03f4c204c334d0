//! CLI argument parsing for utask.
//!
//! Uses clap derive macros for declarative argument definitions.
//! Handlers live in the `commands` module.

use clap::{Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static ENV_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("Invalid env key regex"));

/// utask: trust-boundary task dispatcher.
///
/// Trusted commands run here. Untrusted commands run preprocess and
/// postprocess here and main either here or, when remote execution is
/// enabled in production on Linux, on a batch worker.
#[derive(Parser, Debug)]
#[command(name = "utask")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: ./utask.yaml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dispatch a task command.
    ///
    /// For `postprocess` and `uworker_main` the task argument is an
    /// artifact reference.
    Run(RunArgs),

    /// List registered commands and how they dispatch.
    Commands,

    /// Show the current execution mode and why.
    Mode(ModeArgs),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Registered command name (e.g. fuzz, blame, analyze).
    pub command: String,

    /// Unit of work, or an artifact reference for continuations.
    pub task_argument: String,

    /// Job type the task belongs to.
    #[arg(short, long, default_value = "")]
    pub job_type: String,

    /// Uworker environment override (repeatable).
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

/// Arguments for the `mode` command.
#[derive(Parser, Debug)]
pub struct ModeArgs {
    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse `KEY=VALUE`, requiring an upper-case environment-style key.
pub fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if !ENV_KEY.is_match(key) {
        return Err(format!(
            "invalid environment key '{}': use upper-case letters, digits, and underscores",
            key
        ));
    }
    Ok((key.to_string(), value.to_string()))
}
