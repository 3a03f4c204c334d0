//! Hand-off artifacts between phases.
//!
//! Once produced, an artifact is never mutated; later phases only read it.

use super::UworkerEnv;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Produced by preprocess, consumed by main.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UworkerInput {
    /// Name of the module that produced this input and must process it.
    pub module: String,

    pub task_argument: String,

    pub job_type: String,

    #[serde(default, skip_serializing_if = "UworkerEnv::is_empty")]
    pub uworker_env: UworkerEnv,

    /// Module-defined data.
    pub payload: Value,
}

impl UworkerInput {
    pub fn new(
        module: impl Into<String>,
        task_argument: impl Into<String>,
        job_type: impl Into<String>,
        uworker_env: UworkerEnv,
        payload: Value,
    ) -> Self {
        Self {
            module: module.into(),
            task_argument: task_argument.into(),
            job_type: job_type.into(),
            uworker_env,
            payload,
        }
    }
}

/// Produced by main, consumed by postprocess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UworkerOutput {
    /// Name of the module that produced this output.
    pub module: String,

    /// Reference to the stored input, when main ran from a stored artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_reference: Option<String>,

    /// Module-defined data.
    pub payload: Value,
}

impl UworkerOutput {
    pub fn new(module: impl Into<String>, payload: Value) -> Self {
        Self {
            module: module.into(),
            input_reference: None,
            payload,
        }
    }

    pub fn with_input_reference(mut self, reference: impl Into<String>) -> Self {
        self.input_reference = Some(reference.into());
        self
    }
}
