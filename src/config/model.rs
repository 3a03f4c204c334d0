//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "utask.yaml";

/// Configuration for the dispatcher binary.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Storage
    // =========================================================================
    /// Directory holding stored uworker inputs and outputs.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,

    /// Directory receiving captured stdout/stderr of module and submit commands.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,

    /// NDJSON audit log of dispatch stages (disabled when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_log: Option<String>,

    // =========================================================================
    // Remote execution
    // =========================================================================
    /// Command template that submits a main phase to the batch backend.
    ///
    /// Variables: `{module}`, `{job_type}`, `{input_url}`. Empty means no
    /// backend is configured and remote submissions fail.
    #[serde(default)]
    pub submit_command: String,

    #[serde(default = "default_submit_timeout_seconds")]
    pub submit_timeout_seconds: u64,

    // =========================================================================
    // Modules
    // =========================================================================
    /// Maximum run time of a single module entry point.
    #[serde(default = "default_module_timeout_seconds")]
    pub module_timeout_seconds: u64,

    /// Task modules by command name.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfig>,

    // =========================================================================
    // Environment
    // =========================================================================
    /// Values layered over the process environment for policy decisions.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            logs_dir: default_logs_dir(),
            events_log: None,
            submit_command: String::new(),
            submit_timeout_seconds: default_submit_timeout_seconds(),
            module_timeout_seconds: default_module_timeout_seconds(),
            modules: BTreeMap::new(),
            environment: BTreeMap::new(),
        }
    }
}
