//! The closed set of execution contracts.

use super::{Dispatcher, HaltReason, Outcome};
use crate::environment::EnvironmentPolicy;
use crate::error::{DispatchError, Result};
use crate::events::EventAction;
use crate::execution_mode::ExecutionMode;
use crate::registry::TaskKind;
use crate::remote::create_uworker_main_batch_job;
use crate::task::{TrustedModule, UntrustedModule, UworkerEnv};
use serde_json::json;
use tracing::{error, info, warn};

/// A command's contract bound to the module that implements it.
#[derive(Clone, Copy)]
pub enum TaskVariant<'m> {
    Trusted(&'m dyn TrustedModule),
    UntrustedLocal(&'m dyn UntrustedModule),
    Untrusted(&'m dyn UntrustedModule),
    Postprocess,
    UworkerMain,
}

impl std::fmt::Debug for TaskVariant<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskVariant::Trusted(m) => f.debug_tuple("Trusted").field(&m.name()).finish(),
            TaskVariant::UntrustedLocal(m) => {
                f.debug_tuple("UntrustedLocal").field(&m.name()).finish()
            }
            TaskVariant::Untrusted(m) => f.debug_tuple("Untrusted").field(&m.name()).finish(),
            TaskVariant::Postprocess => f.write_str("Postprocess"),
            TaskVariant::UworkerMain => f.write_str("UworkerMain"),
        }
    }
}

impl<'m> TaskVariant<'m> {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskVariant::Trusted(_) => TaskKind::Trusted,
            TaskVariant::UntrustedLocal(_) => TaskKind::UntrustedLocal,
            TaskVariant::Untrusted(_) => TaskKind::Untrusted,
            TaskVariant::Postprocess => TaskKind::Postprocess,
            TaskVariant::UworkerMain => TaskKind::UworkerMain,
        }
    }

    pub fn is_execution_remote(&self, env: &dyn EnvironmentPolicy) -> bool {
        self.kind().is_execution_remote(env)
    }

    /// Run this contract.
    ///
    /// For the phase-only variants `task_argument` is an artifact reference
    /// and `job_type`/`uworker_env` are ignored.
    pub fn execute(
        &self,
        dispatcher: &Dispatcher<'_>,
        task_argument: &str,
        job_type: &str,
        uworker_env: &UworkerEnv,
    ) -> Result<Outcome> {
        match *self {
            TaskVariant::Trusted(module) => {
                module.run(task_argument, job_type)?;
                info!(module = module.name(), "trusted task done");
                dispatcher.pipeline().record(
                    EventAction::Run,
                    module.name(),
                    Some(task_argument),
                    json!({"job_type": job_type}),
                );
                Ok(Outcome::Ran)
            }
            TaskVariant::UntrustedLocal(module) => {
                execute_locally(dispatcher, module, task_argument, job_type, uworker_env)
            }
            TaskVariant::Untrusted(module) => match ExecutionMode::decide(dispatcher.env()) {
                ExecutionMode::Local => {
                    execute_locally(dispatcher, module, task_argument, job_type, uworker_env)
                }
                ExecutionMode::Remote => {
                    execute_remotely(dispatcher, module, task_argument, job_type, uworker_env)
                }
            },
            TaskVariant::Postprocess => {
                dispatcher
                    .pipeline()
                    .postprocess(dispatcher.modules(), task_argument)?;
                info!(output_reference = task_argument, "utask postprocess: done");
                Ok(Outcome::Completed)
            }
            TaskVariant::UworkerMain => {
                match dispatcher
                    .pipeline()
                    .uworker_main(dispatcher.modules(), task_argument)?
                {
                    Some(output_reference) => {
                        info!(%output_reference, "utask main: done");
                        Ok(Outcome::MainCompleted { output_reference })
                    }
                    None => {
                        warn!(input_reference = task_argument, "utask main produced no output");
                        Ok(Outcome::Halted(HaltReason::NoOutput))
                    }
                }
            }
        }
    }
}

/// All three phases in memory on this machine.
fn execute_locally(
    dispatcher: &Dispatcher<'_>,
    module: &dyn UntrustedModule,
    task_argument: &str,
    job_type: &str,
    uworker_env: &UworkerEnv,
) -> Result<Outcome> {
    let pipeline = dispatcher.pipeline();

    let Some(input) = pipeline.preprocess_no_io(module, task_argument, job_type, uworker_env)?
    else {
        return Ok(halt(dispatcher, module, task_argument, HaltReason::NoInput));
    };

    let Some(output) = pipeline.main_no_io(module, &input)? else {
        return Ok(halt(dispatcher, module, task_argument, HaltReason::NoOutput));
    };

    pipeline.postprocess_no_io(module, &output, &input)?;
    info!(module = module.name(), "utask local: done");
    pipeline.record(EventAction::Complete, module.name(), Some(task_argument), json!(null));
    Ok(Outcome::Completed)
}

/// Preprocess here, then hand main to the batch backend and return.
fn execute_remotely(
    dispatcher: &Dispatcher<'_>,
    module: &dyn UntrustedModule,
    task_argument: &str,
    job_type: &str,
    uworker_env: &UworkerEnv,
) -> Result<Outcome> {
    let pipeline = dispatcher.pipeline();

    let Some(input_reference) = pipeline.preprocess(module, task_argument, job_type, uworker_env)?
    else {
        return Ok(halt(dispatcher, module, task_argument, HaltReason::NoInput));
    };

    if input_reference.trim().is_empty() {
        error!(module = module.name(), "no input reference returned from preprocess");
        return Err(DispatchError::MissingReference(module.name().to_string()));
    }

    create_uworker_main_batch_job(dispatcher.backend(), module.name(), job_type, &input_reference)?;
    pipeline.record(
        EventAction::Submit,
        module.name(),
        Some(task_argument),
        json!({"job_type": job_type, "input_reference": input_reference}),
    );

    Ok(Outcome::Submitted { input_reference })
}

fn halt(
    dispatcher: &Dispatcher<'_>,
    module: &dyn UntrustedModule,
    task_argument: &str,
    reason: HaltReason,
) -> Outcome {
    let outcome = Outcome::Halted(reason);
    warn!(module = module.name(), task_argument, %outcome, "utask stopped early");
    dispatcher.pipeline().record(
        EventAction::Halt,
        module.name(),
        Some(task_argument),
        json!({"reason": format!("{:?}", reason)}),
    );
    outcome
}
