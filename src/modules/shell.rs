//! Task module whose entry points are shell commands.
//!
//! Payloads travel as JSON:
//!
//! - `preprocess` prints the input payload on stdout (empty or `null` means
//!   nothing to do). It sees `{task_argument}` and `{job_type}` and runs with
//!   the uworker env as extra process environment.
//! - `main` reads the input payload on stdin and prints the output payload.
//! - `postprocess` reads `{"output": ..., "input": ...}` on stdin.
//! - `run` (trusted) sees `{task_argument}` and `{job_type}`.
//!
//! A non-zero exit or timeout is a module failure.

use crate::config::ModuleConfig;
use crate::error::{DispatchError, Result};
use crate::process::{CommandOutcome, CommandSpec, run_command};
use crate::task::{TrustedModule, UntrustedModule, UworkerEnv, UworkerInput, UworkerOutput};
use crate::template::vars;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A configured shell task module.
#[derive(Debug, Clone)]
pub struct ShellModule {
    name: String,
    commands: ModuleConfig,
    logs_dir: PathBuf,
    timeout: Duration,
}

impl ShellModule {
    pub fn new(
        name: impl Into<String>,
        commands: ModuleConfig,
        logs_dir: impl AsRef<Path>,
        timeout: Duration,
    ) -> Self {
        let name = name.into();
        let logs_dir = logs_dir.as_ref().join(&name);
        Self {
            name,
            commands,
            logs_dir,
            timeout,
        }
    }

    fn invoke(
        &self,
        phase: &str,
        template: Option<&String>,
        variables: &HashMap<String, String>,
        environment: &UworkerEnv,
        stdin: Option<&str>,
    ) -> Result<CommandOutcome> {
        let template = template.ok_or_else(|| {
            DispatchError::module(&self.name, phase, "no command configured for this phase")
        })?;

        let log_dir = self.logs_dir.join(phase);
        let spec = CommandSpec {
            template,
            variables,
            environment,
            stdin,
            log_dir: &log_dir,
            timeout: self.timeout,
        };

        let outcome = run_command(&spec)
            .map_err(|e| DispatchError::module(&self.name, phase, e.to_string()))?;
        if !outcome.is_success() {
            return Err(DispatchError::module(
                &self.name,
                phase,
                outcome.failure_summary(),
            ));
        }
        Ok(outcome)
    }

    fn parse_payload(&self, phase: &str, stdout: &str) -> Result<Option<Value>> {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(trimmed).map_err(|e| {
            DispatchError::module(&self.name, phase, format!("stdout is not JSON: {}", e))
        })?;
        Ok((!value.is_null()).then_some(value))
    }

    fn encode(&self, phase: &str, value: &Value) -> Result<String> {
        serde_json::to_string(value).map_err(|e| {
            DispatchError::module(&self.name, phase, format!("failed to encode stdin: {}", e))
        })
    }
}

impl TrustedModule for ShellModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, task_argument: &str, job_type: &str) -> Result<()> {
        let variables = vars([("task_argument", task_argument), ("job_type", job_type)]);
        self.invoke(
            "run",
            self.commands.run.as_ref(),
            &variables,
            &UworkerEnv::new(),
            None,
        )?;
        Ok(())
    }
}

impl UntrustedModule for ShellModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn preprocess(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &UworkerEnv,
    ) -> Result<Option<Value>> {
        let variables = vars([("task_argument", task_argument), ("job_type", job_type)]);
        let outcome = self.invoke(
            "preprocess",
            self.commands.preprocess.as_ref(),
            &variables,
            uworker_env,
            None,
        )?;
        self.parse_payload("preprocess", &outcome.stdout)
    }

    fn main(&self, input: &UworkerInput) -> Result<Option<Value>> {
        let stdin = self.encode("main", &input.payload)?;
        let variables = vars([
            ("task_argument", input.task_argument.as_str()),
            ("job_type", input.job_type.as_str()),
        ]);
        let outcome = self.invoke(
            "main",
            self.commands.main.as_ref(),
            &variables,
            &input.uworker_env,
            Some(&stdin),
        )?;
        self.parse_payload("main", &outcome.stdout)
    }

    fn postprocess(&self, output: &UworkerOutput, input: &UworkerInput) -> Result<()> {
        let stdin = self.encode(
            "postprocess",
            &json!({"output": output.payload, "input": input.payload}),
        )?;
        let variables = vars([
            ("task_argument", input.task_argument.as_str()),
            ("job_type", input.job_type.as_str()),
        ]);
        self.invoke(
            "postprocess",
            self.commands.postprocess.as_ref(),
            &variables,
            &UworkerEnv::new(),
            Some(&stdin),
        )?;
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module(temp_dir: &TempDir, commands: ModuleConfig) -> ShellModule {
        ShellModule::new("fuzz_task", commands, temp_dir.path(), Duration::from_secs(10))
    }

    fn phases(preprocess: &str, main: &str, postprocess: &str) -> ModuleConfig {
        ModuleConfig {
            preprocess: Some(preprocess.to_string()),
            main: Some(main.to_string()),
            postprocess: Some(postprocess.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn preprocess_parses_stdout_payload() {
        let temp_dir = TempDir::new().unwrap();
        let module = module(
            &temp_dir,
            phases(
                r#"sh -c 'printf "{{\"target\": \"%s\"}}" {task_argument}'"#,
                "true",
                "true",
            ),
        );

        let payload = module
            .preprocess("target123", "job", &UworkerEnv::new())
            .unwrap();

        assert_eq!(payload, Some(json!({"target": "target123"})));
    }

    #[test]
    fn preprocess_sees_uworker_env() {
        let temp_dir = TempDir::new().unwrap();
        let module = module(
            &temp_dir,
            phases(
                r#"sh -c 'echo "{{\"corpus\": \"$CORPUS\"}}"'"#,
                "true",
                "true",
            ),
        );
        let env = UworkerEnv::from([("CORPUS".to_string(), "libpng".to_string())]);

        let payload = module.preprocess("t", "job", &env).unwrap();

        assert_eq!(payload, Some(json!({"corpus": "libpng"})));
    }

    #[test]
    fn empty_or_null_stdout_means_nothing_to_do() {
        let temp_dir = TempDir::new().unwrap();
        let silent = module(&temp_dir, phases("true", "true", "true"));
        assert_eq!(silent.preprocess("t", "job", &UworkerEnv::new()).unwrap(), None);

        let null = module(&temp_dir, phases("echo null", "true", "true"));
        assert_eq!(null.preprocess("t", "job", &UworkerEnv::new()).unwrap(), None);
    }

    #[test]
    fn main_reads_input_on_stdin() {
        let temp_dir = TempDir::new().unwrap();
        let module = module(&temp_dir, phases("true", "cat", "true"));
        let input = UworkerInput::new(
            "fuzz_task",
            "t",
            "job",
            UworkerEnv::new(),
            json!({"corpus": "x"}),
        );

        let output = module.main(&input).unwrap();

        assert_eq!(output, Some(json!({"corpus": "x"})));
    }

    #[test]
    fn postprocess_receives_output_and_input() {
        let temp_dir = TempDir::new().unwrap();
        let record = temp_dir.path().join("post.json");
        let module = module(
            &temp_dir,
            phases("true", "true", &format!("sh -c \"cat > {}\"", record.display())),
        );
        let input = UworkerInput::new(
            "fuzz_task",
            "t",
            "job",
            UworkerEnv::new(),
            json!({"corpus": "x"}),
        );
        let output = UworkerOutput::new("fuzz_task", json!({"crashes": []}));

        module.postprocess(&output, &input).unwrap();

        let seen: Value = serde_json::from_str(&std::fs::read_to_string(&record).unwrap()).unwrap();
        assert_eq!(seen, json!({"output": {"crashes": []}, "input": {"corpus": "x"}}));
    }

    #[test]
    fn invalid_json_is_module_failure() {
        let temp_dir = TempDir::new().unwrap();
        let module = module(&temp_dir, phases("echo not-json", "true", "true"));

        let err = module
            .preprocess("t", "job", &UworkerEnv::new())
            .unwrap_err();

        assert!(matches!(err, DispatchError::Module { .. }));
        assert!(err.to_string().contains("not JSON"));
    }

    #[test]
    fn nonzero_exit_is_module_failure() {
        let temp_dir = TempDir::new().unwrap();
        let module = module(&temp_dir, phases("sh -c \"exit 4\"", "true", "true"));

        let err = module
            .preprocess("t", "job", &UworkerEnv::new())
            .unwrap_err();

        assert!(err.to_string().contains("exited with code 4"));
    }

    #[test]
    fn missing_phase_command_is_module_failure() {
        let temp_dir = TempDir::new().unwrap();
        let module = module(&temp_dir, ModuleConfig::default());

        let err = TrustedModule::run(&module, "t", "job").unwrap_err();

        assert!(err.to_string().contains("no command configured"));
    }

    #[test]
    fn run_substitutes_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let record = temp_dir.path().join("run.txt");
        let module = module(
            &temp_dir,
            ModuleConfig {
                run: Some(format!(
                    "sh -c \"echo {{task_argument}} {{job_type}} > {}\"",
                    record.display()
                )),
                ..Default::default()
            },
        );

        TrustedModule::run(&module, "testcase-42", "libfuzzer_asan").unwrap();

        let seen = std::fs::read_to_string(&record).unwrap();
        assert_eq!(seen.trim(), "testcase-42 libfuzzer_asan");
    }
}
