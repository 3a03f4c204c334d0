//! Execution-mode decision: run an untrusted task in memory, or split it and
//! offload the main phase to a remote worker.
//!
//! Every function here is a pure predicate over an [`EnvironmentPolicy`] and
//! is re-evaluated on each call.

use crate::environment::{EnvironmentPolicy, LOCAL_DEVELOPMENT, Platform};
use serde::Serialize;
use std::fmt;

/// Marker set when running the untrusted-runner test suite.
pub const UNTRUSTED_RUNNER_TESTS: &str = "UNTRUSTED_RUNNER_TESTS";

/// Marker set when running the utask test suite.
pub const UTASK_TESTS: &str = "UTASK_TESTS";

/// Opt-in flag for remote execution of untrusted main phases.
pub const REMOTE_UTASK_EXECUTION: &str = "REMOTE_UTASK_EXECUTION";

/// The only platform whose main phases can be offloaded.
pub const REMOTE_PLATFORM: Platform = Platform::Linux;

/// Keys that mark a non-production run.
pub const TEST_MODE_MARKERS: [&str; 3] = [UNTRUSTED_RUNNER_TESTS, LOCAL_DEVELOPMENT, UTASK_TESTS];

/// Where the main phase of a splittable task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// All three phases run in memory on this machine.
    Local,
    /// Preprocess runs here; main is submitted to the batch backend.
    Remote,
}

impl ExecutionMode {
    pub fn decide(env: &dyn EnvironmentPolicy) -> Self {
        if is_remotely_executing_utasks(env) {
            ExecutionMode::Remote
        } else {
            ExecutionMode::Local
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Local => write!(f, "local"),
            ExecutionMode::Remote => write!(f, "remote"),
        }
    }
}

/// True unless this is a local development run or a test-mode marker is set.
pub fn is_production(env: &dyn EnvironmentPolicy) -> bool {
    if env.is_local_development() {
        return false;
    }
    !TEST_MODE_MARKERS.iter().any(|marker| env.get_bool(marker))
}

/// Remote execution requires production, the opt-in flag, and the remote platform.
pub fn is_remotely_executing_utasks(env: &dyn EnvironmentPolicy) -> bool {
    is_production(env)
        && env.get_bool(REMOTE_UTASK_EXECUTION)
        && env.platform() == REMOTE_PLATFORM
}

/// The individual inputs behind a mode decision, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ModeReport {
    pub mode: ExecutionMode,
    pub production: bool,
    pub remote_flag: bool,
    pub platform: Platform,
    pub remote_platform: Platform,
}

impl ModeReport {
    pub fn evaluate(env: &dyn EnvironmentPolicy) -> Self {
        Self {
            mode: ExecutionMode::decide(env),
            production: is_production(env),
            remote_flag: env.get_bool(REMOTE_UTASK_EXECUTION),
            platform: env.platform(),
            remote_platform: REMOTE_PLATFORM,
        }
    }
}
