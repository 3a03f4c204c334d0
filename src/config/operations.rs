//! Config loading and validation.

use super::model::Config;
use crate::error::{DispatchError, Result};
use crate::registry::{self, TaskKind};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load `path` if it exists, otherwise return defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document; treat it as all defaults.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| DispatchError::Config(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            DispatchError::Config(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// - timeouts must be positive
    /// - every module key must be a registered command
    /// - trusted commands need `run`; untrusted commands need all three phases
    /// - phase-only commands cannot be configured
    /// - module names are unique across commands
    pub fn validate(&self) -> Result<()> {
        if self.submit_timeout_seconds == 0 {
            return Err(DispatchError::Config(
                "submit_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.module_timeout_seconds == 0 {
            return Err(DispatchError::Config(
                "module_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        let mut owners: BTreeMap<String, &str> = BTreeMap::new();
        for (command, module) in &self.modules {
            let name = module.module_name(command);
            if let Some(other) = owners.insert(name.clone(), command) {
                return Err(DispatchError::Config(format!(
                    "modules.{}: module name '{}' is already used by '{}'",
                    command, name, other
                )));
            }

            let kind = registry::task_kind(command).map_err(|_| {
                DispatchError::Config(format!(
                    "modules.{}: '{}' is not a registered command",
                    command, command
                ))
            })?;

            match kind {
                TaskKind::Trusted => {
                    if module.run.is_none() {
                        return Err(DispatchError::Config(format!(
                            "modules.{}: trusted command requires 'run'",
                            command
                        )));
                    }
                    if module.has_phases() {
                        return Err(DispatchError::Config(format!(
                            "modules.{}: trusted command cannot define preprocess/main/postprocess",
                            command
                        )));
                    }
                }
                TaskKind::Untrusted | TaskKind::UntrustedLocal => {
                    let missing: Vec<_> = [
                        ("preprocess", &module.preprocess),
                        ("main", &module.main),
                        ("postprocess", &module.postprocess),
                    ]
                    .iter()
                    .filter(|(_, cmd)| cmd.is_none())
                    .map(|(phase, _)| *phase)
                    .collect();
                    if !missing.is_empty() {
                        return Err(DispatchError::Config(format!(
                            "modules.{}: untrusted command requires {}",
                            command,
                            missing.join(", ")
                        )));
                    }
                    if module.run.is_some() {
                        return Err(DispatchError::Config(format!(
                            "modules.{}: untrusted command cannot define 'run'",
                            command
                        )));
                    }
                }
                TaskKind::Postprocess | TaskKind::UworkerMain => {
                    return Err(DispatchError::Config(format!(
                        "modules.{}: continuation commands take no module",
                        command
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_seconds)
    }

    pub fn module_timeout(&self) -> Duration {
        Duration::from_secs(self.module_timeout_seconds)
    }
}
