//! Batch backends driven by a configured command.

use super::BatchBackend;
use crate::error::{DispatchError, Result};
use crate::process::{CommandSpec, run_command};
use crate::template::vars;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Submits jobs by running a command template.
///
/// The template may reference `{module}`, `{job_type}`, and `{input_url}`.
/// A zero exit status means the backend accepted the job.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    template: String,
    log_dir: PathBuf,
    timeout: Duration,
}

impl CommandBackend {
    pub fn new(
        template: impl Into<String>,
        log_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            template: template.into(),
            log_dir: log_dir.into(),
            timeout,
        }
    }
}

impl BatchBackend for CommandBackend {
    fn submit(&self, module_name: &str, job_type: &str, input_reference: &str) -> Result<()> {
        let variables = vars([
            ("module", module_name),
            ("job_type", job_type),
            ("input_url", input_reference),
        ]);
        let environment = BTreeMap::new();
        let spec = CommandSpec {
            template: &self.template,
            variables: &variables,
            environment: &environment,
            stdin: None,
            log_dir: &self.log_dir,
            timeout: self.timeout,
        };

        let outcome = run_command(&spec).map_err(|e| DispatchError::Submission(e.to_string()))?;
        if !outcome.is_success() {
            return Err(DispatchError::Submission(outcome.failure_summary()));
        }
        Ok(())
    }
}

/// Backend used when no submit command is configured. Every submission fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredBackend;

impl BatchBackend for UnconfiguredBackend {
    fn submit(&self, module_name: &str, _job_type: &str, _input_reference: &str) -> Result<()> {
        Err(DispatchError::Submission(format!(
            "no submit_command configured; cannot offload main phase of '{}'",
            module_name
        )))
    }
}
