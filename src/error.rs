//! Error types for task dispatch.
//!
//! Uses thiserror for derive macros. Every failure is surfaced to the caller;
//! the dispatcher never retries or falls back on its own.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for dispatch operations.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The command name is not in the command registry.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// No task module is bound for a command or artifact module name.
    #[error("no task module registered for '{0}'")]
    ModuleNotFound(String),

    /// A task module entry point failed.
    #[error("task module '{module}' failed in {phase}: {message}")]
    Module {
        module: String,
        phase: String,
        message: String,
    },

    /// Preprocess succeeded but produced no artifact reference to dispatch.
    #[error("preprocess of '{0}' returned no input reference")]
    MissingReference(String),

    /// The batch backend rejected the job or could not be reached.
    #[error("remote submission failed: {0}")]
    Submission(String),

    /// An artifact could not be written, read, or decoded.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Configuration could not be loaded or failed validation.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid user input or a local I/O failure around the dispatcher.
    #[error("{0}")]
    UserError(String),
}

impl DispatchError {
    /// Convenience constructor for entry-point failures.
    pub fn module(module: &str, phase: &str, message: impl Into<String>) -> Self {
        DispatchError::Module {
            module: module.to_string(),
            phase: phase.to_string(),
            message: message.into(),
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::UnknownCommand(_) | DispatchError::ModuleNotFound(_) => {
                exit_codes::LOOKUP_FAILURE
            }
            DispatchError::Module { .. } => exit_codes::MODULE_FAILURE,
            DispatchError::Submission(_) => exit_codes::SUBMISSION_FAILURE,
            DispatchError::MissingReference(_) | DispatchError::Artifact(_) => {
                exit_codes::ARTIFACT_FAILURE
            }
            DispatchError::Config(_) | DispatchError::UserError(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
