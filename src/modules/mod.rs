//! Task modules built from configuration.
//!
//! The dispatcher binary has no compiled-in business logic; each command's
//! module is a set of shell command templates from `utask.yaml`.

mod shell;

pub use shell::ShellModule;

use crate::config::Config;
use crate::error::{DispatchError, Result};
use crate::registry::{self, TaskKind};
use crate::task::ModuleSet;
use std::path::Path;

/// Bind every configured module to its command.
pub fn load_modules(config: &Config) -> Result<ModuleSet> {
    let mut modules = ModuleSet::new();
    let logs_dir = Path::new(&config.logs_dir);

    for (command, module_config) in &config.modules {
        let module = ShellModule::new(
            module_config.module_name(command),
            module_config.clone(),
            logs_dir,
            config.module_timeout(),
        );
        match registry::task_kind(command)? {
            TaskKind::Trusted => {
                modules.bind_trusted(command.clone(), Box::new(module))?;
            }
            TaskKind::Untrusted | TaskKind::UntrustedLocal => {
                modules.bind_untrusted(command.clone(), Box::new(module))?;
            }
            TaskKind::Postprocess | TaskKind::UworkerMain => {
                return Err(DispatchError::Config(format!(
                    "continuation command '{}' cannot have a module",
                    command
                )));
            }
        }
    }

    Ok(modules)
}
