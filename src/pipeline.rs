//! The preprocess → main → postprocess phase protocol.
//!
//! Two I/O strategies:
//!
//! - **No-I/O** (`*_no_io`): phases hand artifacts to each other in memory.
//!   Used when the whole task runs on this machine.
//! - **I/O-mediated**: each phase stores its artifact and passes a reference.
//!   [`Pipeline::preprocess`] runs on the trusted machine before a remote
//!   submission; [`Pipeline::uworker_main`] and [`Pipeline::postprocess`] are
//!   the continuations, run later from the stored references.
//!
//! Every phase is logged and, when an [`EventLog`] is attached, audited.

use crate::artifacts::ArtifactStore;
use crate::error::{DispatchError, Result};
use crate::events::{Event, EventAction, EventLog};
use crate::task::{ModuleSet, UntrustedModule, UworkerEnv, UworkerInput, UworkerOutput};
use serde_json::{Value, json};
use tracing::{info, warn};

/// Phase runner bound to an artifact store and an optional audit log.
#[derive(Clone, Copy)]
pub struct Pipeline<'a> {
    store: &'a dyn ArtifactStore,
    events: Option<&'a EventLog>,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a dyn ArtifactStore, events: Option<&'a EventLog>) -> Self {
        Self { store, events }
    }

    /// Trusted preprocess, result kept in memory.
    pub fn preprocess_no_io(
        &self,
        module: &dyn UntrustedModule,
        task_argument: &str,
        job_type: &str,
        uworker_env: &UworkerEnv,
    ) -> Result<Option<UworkerInput>> {
        let Some(payload) = module.preprocess(task_argument, job_type, uworker_env)? else {
            return Ok(None);
        };
        info!(module = module.name(), task_argument, "utask: done with preprocess");
        self.record(
            EventAction::Preprocess,
            module.name(),
            Some(task_argument),
            json!({"job_type": job_type}),
        );

        Ok(Some(UworkerInput::new(
            module.name(),
            task_argument,
            job_type,
            uworker_env.clone(),
            payload,
        )))
    }

    /// Untrusted main, result kept in memory.
    pub fn main_no_io(
        &self,
        module: &dyn UntrustedModule,
        input: &UworkerInput,
    ) -> Result<Option<UworkerOutput>> {
        let Some(payload) = module.main(input)? else {
            return Ok(None);
        };
        info!(
            module = module.name(),
            task_argument = %input.task_argument,
            "utask: done with main"
        );
        self.record(
            EventAction::Main,
            module.name(),
            Some(&input.task_argument),
            Value::Null,
        );

        Ok(Some(UworkerOutput::new(module.name(), payload)))
    }

    /// Trusted postprocess of in-memory artifacts.
    pub fn postprocess_no_io(
        &self,
        module: &dyn UntrustedModule,
        output: &UworkerOutput,
        input: &UworkerInput,
    ) -> Result<()> {
        module.postprocess(output, input)?;
        info!(
            module = module.name(),
            task_argument = %input.task_argument,
            "utask: done with postprocess"
        );
        self.record(
            EventAction::Postprocess,
            module.name(),
            Some(&input.task_argument),
            Value::Null,
        );
        Ok(())
    }

    /// Trusted preprocess whose input is stored for a remote main phase.
    ///
    /// Returns the stored input's reference, or `None` when the module has
    /// nothing to do.
    pub fn preprocess(
        &self,
        module: &dyn UntrustedModule,
        task_argument: &str,
        job_type: &str,
        uworker_env: &UworkerEnv,
    ) -> Result<Option<String>> {
        let Some(input) = self.preprocess_no_io(module, task_argument, job_type, uworker_env)?
        else {
            return Ok(None);
        };
        let reference = self.store.store_input(&input)?;
        info!(module = module.name(), %reference, "stored uworker input");
        Ok(Some(reference))
    }

    /// Continuation: run main on a stored input and store its output.
    ///
    /// The module is resolved from the artifact, not from the caller. Returns
    /// the output reference, or `None` when main produced nothing.
    pub fn uworker_main(
        &self,
        modules: &ModuleSet,
        input_reference: &str,
    ) -> Result<Option<String>> {
        let input = self.store.load_input(input_reference)?;
        let module = modules.untrusted_by_name(&input.module)?;

        let Some(output) = self.main_no_io(module, &input)? else {
            return Ok(None);
        };
        let output = output.with_input_reference(input_reference);
        let reference = self.store.store_output(&output)?;
        info!(module = module.name(), %reference, "stored uworker output");
        Ok(Some(reference))
    }

    /// Continuation: postprocess a stored output against the input it came from.
    pub fn postprocess(&self, modules: &ModuleSet, output_reference: &str) -> Result<()> {
        let output = self.store.load_output(output_reference)?;
        let input_reference = output.input_reference.as_deref().ok_or_else(|| {
            DispatchError::Artifact(format!(
                "output '{}' does not reference its input",
                output_reference
            ))
        })?;
        let input = self.store.load_input(input_reference)?;

        if input.module != output.module {
            return Err(DispatchError::Artifact(format!(
                "output '{}' was produced by '{}' but its input belongs to '{}'",
                output_reference, output.module, input.module
            )));
        }

        let module = modules.untrusted_by_name(&output.module)?;
        self.postprocess_no_io(module, &output, &input)
    }

    /// Append an audit event. Failures are logged, never returned.
    pub(crate) fn record(
        &self,
        action: EventAction,
        module: &str,
        task: Option<&str>,
        details: Value,
    ) {
        let Some(log) = self.events else {
            return;
        };
        let mut event = Event::new(action, module);
        if let Some(task) = task {
            event = event.with_task(task);
        }
        if !details.is_null() {
            event = event.with_details(details);
        }
        if let Err(e) = log.append(&event) {
            warn!(error = %e, path = %log.path().display(), "failed to append audit event");
        }
    }
}
