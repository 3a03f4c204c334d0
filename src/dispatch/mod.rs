//! Task dispatch: resolve a command, bind its module, run its contract.
//!
//! A [`Dispatcher`] borrows its collaborators (environment policy, modules,
//! artifact store, batch backend) and holds no state between invocations.
//! Each call to [`Dispatcher::execute`] runs synchronously on the calling
//! thread, one phase after another.

mod variant;


pub use variant::TaskVariant;

use crate::artifacts::ArtifactStore;
use crate::environment::EnvironmentPolicy;
use crate::error::Result;
use crate::events::EventLog;
use crate::pipeline::Pipeline;
use crate::registry;
use crate::remote::BatchBackend;
use crate::task::{ModuleSet, UworkerEnv};
use std::fmt;
use tracing::info_span;

/// Why a pipeline stopped early without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// Preprocess produced no input.
    NoInput,
    /// Main produced no output.
    NoOutput,
}

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A trusted task ran.
    Ran,
    /// All remaining phases ran.
    Completed,
    /// The pipeline stopped because a phase had nothing to hand on.
    Halted(HaltReason),
    /// Preprocess ran here and main was submitted to the batch backend.
    Submitted { input_reference: String },
    /// A `uworker_main` continuation stored its output.
    MainCompleted { output_reference: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ran => write!(f, "ran"),
            Outcome::Completed => write!(f, "completed"),
            Outcome::Halted(HaltReason::NoInput) => {
                write!(f, "halted: preprocess had nothing to do")
            }
            Outcome::Halted(HaltReason::NoOutput) => write!(f, "halted: main produced no output"),
            Outcome::Submitted { input_reference } => {
                write!(f, "submitted main phase (input {})", input_reference)
            }
            Outcome::MainCompleted { output_reference } => {
                write!(f, "main completed (output {})", output_reference)
            }
        }
    }
}

/// Entry point for running commands.
pub struct Dispatcher<'a> {
    env: &'a dyn EnvironmentPolicy,
    modules: &'a ModuleSet,
    store: &'a dyn ArtifactStore,
    backend: &'a dyn BatchBackend,
    events: Option<&'a EventLog>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        env: &'a dyn EnvironmentPolicy,
        modules: &'a ModuleSet,
        store: &'a dyn ArtifactStore,
        backend: &'a dyn BatchBackend,
    ) -> Self {
        Self {
            env,
            modules,
            store,
            backend,
            events: None,
        }
    }

    /// Audit each stage to `events`.
    pub fn with_events(mut self, events: &'a EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn env(&self) -> &'a dyn EnvironmentPolicy {
        self.env
    }

    pub fn modules(&self) -> &'a ModuleSet {
        self.modules
    }

    pub fn backend(&self) -> &'a dyn BatchBackend {
        self.backend
    }

    pub fn pipeline(&self) -> Pipeline<'a> {
        Pipeline::new(self.store, self.events)
    }

    /// Resolve `command` to its variant without running it.
    pub fn resolve(&self, command: &str) -> Result<TaskVariant<'a>> {
        registry::task_kind(command)?.bind(command, self.modules)
    }

    /// Run `command` on `task_argument`.
    ///
    /// Errors from lookup, module entry points, artifact storage, or
    /// submission propagate unchanged. Nothing is retried.
    pub fn execute(
        &self,
        command: &str,
        task_argument: &str,
        job_type: &str,
        uworker_env: &UworkerEnv,
    ) -> Result<Outcome> {
        let span = info_span!("dispatch", command, task_argument, job_type);
        let _enter = span.enter();

        let variant = self.resolve(command)?;
        variant.execute(self, task_argument, job_type, uworker_env)
    }
}
