//! Command registry: which trust contract each command runs under.
//!
//! The table is fixed at compile time and built once per process. Unknown
//! commands are an error, never a default: misclassifying a command would let
//! untrusted code run with trusted credentials.
//!
//! The testcase-processing commands (`analyze`, `minimize`, `progression`,
//! `regression`, `symbolize`, `variant`) are splittable: their main phase is
//! offloaded to a batch worker whenever remote execution is enabled. `fuzz`
//! and `corpus_pruning` keep every phase on this machine regardless of mode.

use crate::dispatch::TaskVariant;
use crate::environment::EnvironmentPolicy;
use crate::error::{DispatchError, Result};
use crate::execution_mode::is_remotely_executing_utasks;
use crate::task::ModuleSet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Execution contract of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Single entry point, run synchronously on this trusted machine.
    Trusted,
    /// Three phases, always in memory on this machine.
    UntrustedLocal,
    /// Three phases; main is offloaded when the execution mode is remote.
    Untrusted,
    /// Continuation that postprocesses a stored output.
    Postprocess,
    /// Continuation that runs main on a stored input.
    UworkerMain,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Trusted => "trusted",
            TaskKind::UntrustedLocal => "untrusted_local",
            TaskKind::Untrusted => "untrusted",
            TaskKind::Postprocess => "postprocess",
            TaskKind::UworkerMain => "uworker_main",
        }
    }

    /// Whether this kind's execution happens remotely under `env` right now.
    ///
    /// Only [`TaskKind::Untrusted`] can be remote, and only while the
    /// execution mode says so. Evaluated fresh on every call.
    pub fn is_execution_remote(&self, env: &dyn EnvironmentPolicy) -> bool {
        match self {
            TaskKind::Untrusted => is_remotely_executing_utasks(env),
            TaskKind::Trusted
            | TaskKind::UntrustedLocal
            | TaskKind::Postprocess
            | TaskKind::UworkerMain => false,
        }
    }

    /// Construct the variant for `command`, binding its task module.
    ///
    /// Phase-only kinds need no module: theirs travels inside the artifact.
    pub fn bind<'m>(&self, command: &str, modules: &'m ModuleSet) -> Result<TaskVariant<'m>> {
        Ok(match self {
            TaskKind::Trusted => TaskVariant::Trusted(modules.trusted(command)?),
            TaskKind::UntrustedLocal => TaskVariant::UntrustedLocal(modules.untrusted(command)?),
            TaskKind::Untrusted => TaskVariant::Untrusted(modules.untrusted(command)?),
            TaskKind::Postprocess => TaskVariant::Postprocess,
            TaskKind::UworkerMain => TaskVariant::UworkerMain,
        })
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static COMMAND_TYPES: LazyLock<BTreeMap<&'static str, TaskKind>> = LazyLock::new(|| {
    BTreeMap::from([
        ("analyze", TaskKind::Untrusted),
        ("blame", TaskKind::Trusted),
        ("corpus_pruning", TaskKind::UntrustedLocal),
        ("fuzz", TaskKind::UntrustedLocal),
        ("impact", TaskKind::Trusted),
        ("minimize", TaskKind::Untrusted),
        ("progression", TaskKind::Untrusted),
        ("regression", TaskKind::Untrusted),
        ("symbolize", TaskKind::Untrusted),
        ("unpack", TaskKind::Trusted),
        ("postprocess", TaskKind::Postprocess),
        ("uworker_main", TaskKind::UworkerMain),
        ("variant", TaskKind::Untrusted),
    ])
});

/// Look up the execution contract for `command`.
pub fn task_kind(command: &str) -> Result<TaskKind> {
    COMMAND_TYPES
        .get(command)
        .copied()
        .ok_or_else(|| DispatchError::UnknownCommand(command.to_string()))
}

/// Whether `command` would currently offload its main phase.
pub fn is_remote_utask(command: &str, env: &dyn EnvironmentPolicy) -> Result<bool> {
    Ok(task_kind(command)?.is_execution_remote(env))
}

/// All registered commands in name order.
pub fn commands() -> impl Iterator<Item = (&'static str, TaskKind)> {
    COMMAND_TYPES.iter().map(|(name, kind)| (*name, *kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{EnvironmentSnapshot, Platform};
    use crate::execution_mode::{REMOTE_UTASK_EXECUTION, UTASK_TESTS};
    use crate::test_support::{StubTrusted, StubUntrusted};

    fn environments() -> Vec<EnvironmentSnapshot> {
        let remote = EnvironmentSnapshot::new(Platform::Linux).with(REMOTE_UTASK_EXECUTION, "1");
        vec![
            EnvironmentSnapshot::new(Platform::Linux),
            remote.clone(),
            remote.clone().on(Platform::Mac),
            remote.with(UTASK_TESTS, "1"),
        ]
    }

    #[test]
    fn known_commands_resolve() {
        assert_eq!(task_kind("fuzz").unwrap(), TaskKind::UntrustedLocal);
        assert_eq!(task_kind("blame").unwrap(), TaskKind::Trusted);
        assert_eq!(task_kind("analyze").unwrap(), TaskKind::Untrusted);
        assert_eq!(task_kind("postprocess").unwrap(), TaskKind::Postprocess);
        assert_eq!(task_kind("uworker_main").unwrap(), TaskKind::UworkerMain);
    }

    #[test]
    fn testcase_commands_are_splittable() {
        let splittable: Vec<_> = commands()
            .filter(|(_, kind)| *kind == TaskKind::Untrusted)
            .map(|(command, _)| command)
            .collect();
        assert_eq!(
            splittable,
            vec!["analyze", "minimize", "progression", "regression", "symbolize", "variant"]
        );
        assert_eq!(task_kind("corpus_pruning").unwrap(), TaskKind::UntrustedLocal);
    }

    #[test]
    fn unknown_command_is_lookup_error() {
        let err = task_kind("frobnicate").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCommand(ref c) if c == "frobnicate"));

        let env = EnvironmentSnapshot::new(Platform::Linux);
        assert!(is_remote_utask("frobnicate", &env).is_err());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(task_kind("FUZZ").is_err());
    }

    #[test]
    fn only_untrusted_splittable_can_be_remote() {
        for env in environments() {
            for (command, kind) in commands() {
                if kind != TaskKind::Untrusted {
                    assert!(
                        !is_remote_utask(command, &env).unwrap(),
                        "{command} must never execute remotely"
                    );
                }
            }
        }
    }

    #[test]
    fn splittable_commands_follow_execution_mode() {
        let remote = EnvironmentSnapshot::new(Platform::Linux).with(REMOTE_UTASK_EXECUTION, "1");
        assert!(is_remote_utask("analyze", &remote).unwrap());
        assert!(!is_remote_utask("analyze", &remote.clone().on(Platform::Windows)).unwrap());
        assert!(!is_remote_utask("analyze", &remote.without(REMOTE_UTASK_EXECUTION)).unwrap());
    }

    #[test]
    fn commands_are_sorted_and_complete() {
        let names: Vec<_> = commands().map(|(name, _)| name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn bind_requires_matching_module() {
        let mut modules = ModuleSet::new();
        modules
            .bind_trusted("blame", Box::new(StubTrusted::new("blame_task")))
            .unwrap();
        modules
            .bind_untrusted("fuzz", Box::new(StubUntrusted::new("fuzz_task")))
            .unwrap();

        assert!(matches!(
            TaskKind::Trusted.bind("blame", &modules),
            Ok(TaskVariant::Trusted(_))
        ));
        assert!(matches!(
            TaskKind::UntrustedLocal.bind("fuzz", &modules),
            Ok(TaskVariant::UntrustedLocal(_))
        ));
        assert!(matches!(
            TaskKind::Untrusted.bind("analyze", &modules),
            Err(DispatchError::ModuleNotFound(_))
        ));
    }

    #[test]
    fn phase_only_kinds_bind_without_module() {
        let modules = ModuleSet::new();
        assert!(matches!(
            TaskKind::Postprocess.bind("postprocess", &modules),
            Ok(TaskVariant::Postprocess)
        ));
        assert!(matches!(
            TaskKind::UworkerMain.bind("uworker_main", &modules),
            Ok(TaskVariant::UworkerMain)
        ));
    }
}
