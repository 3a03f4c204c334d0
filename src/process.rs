//! Subprocess execution with timeout and captured output.
//!
//! Used by shell task modules and the command-template batch backend. The
//! command string is rendered from a template, split with shell-words (no
//! shell is involved), and run with stdout/stderr captured to log files.
//! Optional stdin content is written to a file and attached.

use crate::template::{TemplateError, render_template};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Number of trailing stderr bytes kept for error messages.
const STDERR_TAIL_BYTES: usize = 2048;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Failure to start or supervise a command. A command that runs and exits
/// non-zero is not an error here; see [`CommandOutcome::is_success`].
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("invalid command template '{template}': {source}")]
    Template {
        template: String,
        source: TemplateError,
    },

    #[error("failed to parse command '{command}': {message}")]
    Parse { command: String, message: String },

    #[error("command is empty after parsing: '{0}'")]
    Empty(String),

    #[error("failed to execute '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

/// What to run and how.
#[derive(Debug, Clone)]
pub struct CommandSpec<'a> {
    pub template: &'a str,
    pub variables: &'a HashMap<String, String>,
    /// Extra environment variables for the child.
    pub environment: &'a BTreeMap<String, String>,
    /// Content written to the child's stdin.
    pub stdin: Option<&'a str>,
    /// Directory receiving `stdin.json`, `stdout.log`, and `stderr.log`.
    pub log_dir: &'a Path,
    pub timeout: Duration,
}

/// Result of running a command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Exit code (None if killed or terminated by a signal).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr_path: PathBuf,
    pub duration: Duration,
    pub timed_out: bool,
    /// The rendered command line.
    pub command: String,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Short description of a failed run, including the end of stderr.
    pub fn failure_summary(&self) -> String {
        let status = if self.timed_out {
            format!("timed out after {:?}", self.duration)
        } else {
            match self.exit_code {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            }
        };

        let tail = stderr_tail(&self.stderr_path);
        if tail.is_empty() {
            format!("'{}' {}", self.command, status)
        } else {
            format!("'{}' {}: {}", self.command, status, tail)
        }
    }
}

/// Render, spawn, and wait for a command.
pub fn run_command(spec: &CommandSpec<'_>) -> Result<CommandOutcome, ProcessError> {
    let command_str =
        render_template(spec.template, spec.variables).map_err(|source| ProcessError::Template {
            template: spec.template.to_string(),
            source,
        })?;

    let args = shell_words::split(&command_str).map_err(|e| ProcessError::Parse {
        command: command_str.clone(),
        message: e.to_string(),
    })?;
    let Some((program, program_args)) = args.split_first() else {
        return Err(ProcessError::Empty(command_str));
    };

    std::fs::create_dir_all(spec.log_dir).map_err(|source| ProcessError::Io {
        context: format!("failed to create log directory '{}'", spec.log_dir.display()),
        source,
    })?;

    let stdout_path = spec.log_dir.join("stdout.log");
    let stderr_path = spec.log_dir.join("stderr.log");
    let stdout_file = create(&stdout_path)?;
    let stderr_file = create(&stderr_path)?;

    let stdin = match spec.stdin {
        Some(content) => {
            let stdin_path = spec.log_dir.join("stdin.json");
            std::fs::write(&stdin_path, content).map_err(|source| ProcessError::Io {
                context: format!("failed to write '{}'", stdin_path.display()),
                source,
            })?;
            let file = File::open(&stdin_path).map_err(|source| ProcessError::Io {
                context: format!("failed to open '{}'", stdin_path.display()),
                source,
            })?;
            Stdio::from(file)
        }
        None => Stdio::null(),
    };

    let mut command = Command::new(program);
    command
        .args(program_args)
        .stdin(stdin)
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file));
    for (key, value) in spec.environment {
        command.env(key, value);
    }

    debug!(command = %command_str, "spawning");
    let start = Instant::now();
    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    let (exit_code, timed_out) = wait_with_timeout(&mut child, spec.timeout)?;
    let duration = start.elapsed();

    let stdout = std::fs::read_to_string(&stdout_path).map_err(|source| ProcessError::Io {
        context: format!("failed to read '{}'", stdout_path.display()),
        source,
    })?;

    Ok(CommandOutcome {
        exit_code,
        stdout,
        stderr_path,
        duration,
        timed_out,
        command: command_str,
    })
}

fn create(path: &Path) -> Result<File, ProcessError> {
    File::create(path).map_err(|source| ProcessError::Io {
        context: format!("failed to create '{}'", path.display()),
        source,
    })
}

/// Returns (exit_code, timed_out).
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> Result<(Option<i32>, bool), ProcessError> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status.code(), false)),
            Ok(None) if start.elapsed() >= timeout => {
                // SIGKILL on Unix, TerminateProcess on Windows.
                let _ = child.kill();
                let _ = child.wait();
                return Ok((None, true));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(source) => {
                return Err(ProcessError::Io {
                    context: "failed to check process status".to_string(),
                    source,
                });
            }
        }
    }
}

fn stderr_tail(path: &Path) -> String {
    let Ok(content) = std::fs::read_to_string(path) else {
        return String::new();
    };
    let trimmed = content.trim();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}
