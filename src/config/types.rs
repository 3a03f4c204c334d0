//! Config value types and default functions.

use serde::{Deserialize, Serialize};

/// A task module implemented by shell commands.
///
/// Each entry point is a command template. Trusted commands only need `run`;
/// untrusted commands need `preprocess`, `main`, and `postprocess`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Module identity carried in artifacts (defaults to `<command>_task`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocess: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<String>,
}

impl ModuleConfig {
    pub fn module_name(&self, command: &str) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}_task", command))
    }

    /// True when any of the three split-phase commands is set.
    pub fn has_phases(&self) -> bool {
        self.preprocess.is_some() || self.main.is_some() || self.postprocess.is_some()
    }
}

pub(crate) fn default_artifacts_dir() -> String {
    ".utask/artifacts".to_string()
}

pub(crate) fn default_logs_dir() -> String {
    ".utask/logs".to_string()
}

pub(crate) fn default_submit_timeout_seconds() -> u64 {
    60
}

pub(crate) fn default_module_timeout_seconds() -> u64 {
    3600
}
