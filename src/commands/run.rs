//! `utask run`: dispatch one task invocation.

use crate::artifacts::FsArtifactStore;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::events::EventLog;
use crate::modules::load_modules;
use crate::remote::{BatchBackend, CommandBackend, UnconfiguredBackend};
use crate::task::UworkerEnv;
use std::path::Path;

pub(super) fn cmd_run(config: &Config, args: RunArgs) -> Result<()> {
    let env = super::environment(config);
    let modules = load_modules(config)?;
    let store = FsArtifactStore::new(&config.artifacts_dir);
    let backend = backend(config);
    let events = config.events_log.as_ref().map(EventLog::new);

    let mut dispatcher = Dispatcher::new(&env, &modules, &store, backend.as_ref());
    if let Some(events) = &events {
        dispatcher = dispatcher.with_events(events);
    }

    let uworker_env: UworkerEnv = args.env.into_iter().collect();
    let outcome = dispatcher.execute(
        &args.command,
        &args.task_argument,
        &args.job_type,
        &uworker_env,
    )?;

    println!("{}: {}", args.command, outcome);
    Ok(())
}

fn backend(config: &Config) -> Box<dyn BatchBackend> {
    if config.submit_command.trim().is_empty() {
        return Box::new(UnconfiguredBackend);
    }
    Box::new(CommandBackend::new(
        config.submit_command.clone(),
        Path::new(&config.logs_dir).join("submit"),
        config.submit_timeout(),
    ))
}
