//! Remote dispatch of untrusted main phases.
//!
//! Submission is fire-and-forget: the backend accepts a job and the call
//! returns. Completion is handled out of band by a separate `uworker_main` or
//! `postprocess` invocation acting on stored artifacts.

mod command;

pub use command::{CommandBackend, UnconfiguredBackend};

use crate::error::Result;
use tracing::info;

/// External batch-job backend.
pub trait BatchBackend {
    /// Queue the main phase of `module_name` on `input_reference`.
    ///
    /// Returns once the backend has accepted the job. Rejection or an
    /// unreachable backend is a [`crate::error::DispatchError::Submission`].
    fn submit(&self, module_name: &str, job_type: &str, input_reference: &str) -> Result<()>;
}

/// Submit the main phase of a split task to the batch backend.
pub fn create_uworker_main_batch_job(
    backend: &dyn BatchBackend,
    module_name: &str,
    job_type: &str,
    input_reference: &str,
) -> Result<()> {
    backend.submit(module_name, job_type, input_reference)?;
    info!(
        module = module_name,
        job_type, input_reference, "submitted uworker main batch job"
    );
    Ok(())
}
