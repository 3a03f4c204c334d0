//! `utask commands`: show the command registry.

use crate::config::Config;
use crate::error::Result;
use crate::registry::{self, TaskKind};

pub(super) fn cmd_commands(config: &Config) -> Result<()> {
    let env = super::environment(config);

    println!("{:<16} {:<16} {:<8} MODULE", "COMMAND", "KIND", "REMOTE");
    for (command, kind) in registry::commands() {
        let remote = if kind.is_execution_remote(&env) {
            "yes"
        } else {
            "no"
        };
        let module = match kind {
            TaskKind::Postprocess | TaskKind::UworkerMain => "(from artifact)".to_string(),
            _ => config
                .modules
                .get(command)
                .map(|m| m.module_name(command))
                .unwrap_or_else(|| "-".to_string()),
        };
        println!("{:<16} {:<16} {:<8} {}", command, kind.as_str(), remote, module);
    }

    Ok(())
}
