//! Task module contracts.
//!
//! A task module is the business logic behind one command. The dispatcher only
//! knows how to call its entry points:
//!
//! - [`TrustedModule::run`] for tasks that run entirely on a trusted machine.
//! - [`UntrustedModule`] `preprocess` / `main` / `postprocess` for tasks whose
//!   main phase may run on an isolated worker.
//!
//! Modules are bound to command names in a [`ModuleSet`].

mod artifact;


pub use artifact::{UworkerInput, UworkerOutput};

use crate::error::{DispatchError, Result};
use crate::registry::{self, TaskKind};
use serde_json::Value;
use std::collections::BTreeMap;

/// Environment overrides that only apply to untrusted execution.
pub type UworkerEnv = BTreeMap<String, String>;

/// A task that runs synchronously on the current trusted machine.
pub trait TrustedModule {
    /// Module identity, used in logs and audit events.
    fn name(&self) -> &str;

    fn run(&self, task_argument: &str, job_type: &str) -> Result<()>;
}

/// A task split into trusted preprocess/postprocess and an untrusted main phase.
///
/// Payloads are opaque JSON values. The dispatcher wraps them in
/// [`UworkerInput`] / [`UworkerOutput`] and stamps the module name so the
/// continuation can find this module again on another machine.
pub trait UntrustedModule {
    /// Module identity carried inside every artifact this module produces.
    fn name(&self) -> &str;

    /// Trusted. `None` means there is nothing to do.
    fn preprocess(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &UworkerEnv,
    ) -> Result<Option<Value>>;

    /// Untrusted. `None` means there is nothing to postprocess.
    fn main(&self, input: &UworkerInput) -> Result<Option<Value>>;

    /// Trusted.
    fn postprocess(&self, output: &UworkerOutput, input: &UworkerInput) -> Result<()>;
}

/// Task modules bound to command names.
#[derive(Default)]
pub struct ModuleSet {
    trusted: BTreeMap<String, Box<dyn TrustedModule>>,
    untrusted: BTreeMap<String, Box<dyn UntrustedModule>>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a trusted module to `command`, replacing any previous binding
    /// of that command.
    ///
    /// Fails if another command already has a module with the same name.
    pub fn bind_trusted(
        &mut self,
        command: impl Into<String>,
        module: Box<dyn TrustedModule>,
    ) -> Result<&mut Self> {
        let command = command.into();
        self.ensure_name_free(&command, module.name())?;
        self.trusted.insert(command, module);
        Ok(self)
    }

    /// Bind an untrusted module to `command`, replacing any previous binding
    /// of that command.
    ///
    /// Fails if another command already has a module with the same name.
    pub fn bind_untrusted(
        &mut self,
        command: impl Into<String>,
        module: Box<dyn UntrustedModule>,
    ) -> Result<&mut Self> {
        let command = command.into();
        self.ensure_name_free(&command, module.name())?;
        self.untrusted.insert(command, module);
        Ok(self)
    }

    fn ensure_name_free(&self, command: &str, name: &str) -> Result<()> {
        let owner = self
            .trusted
            .iter()
            .map(|(c, m)| (c, m.name()))
            .chain(self.untrusted.iter().map(|(c, m)| (c, m.name())))
            .find(|(c, n)| c.as_str() != command && *n == name);

        match owner {
            Some((other, _)) => Err(DispatchError::Config(format!(
                "module name '{}' is already bound to command '{}'",
                name, other
            ))),
            None => Ok(()),
        }
    }

    pub fn trusted(&self, command: &str) -> Result<&dyn TrustedModule> {
        self.trusted
            .get(command)
            .map(|m| m.as_ref())
            .ok_or_else(|| DispatchError::ModuleNotFound(command.to_string()))
    }

    pub fn untrusted(&self, command: &str) -> Result<&dyn UntrustedModule> {
        self.untrusted
            .get(command)
            .map(|m| m.as_ref())
            .ok_or_else(|| DispatchError::ModuleNotFound(command.to_string()))
    }

    /// Find the module named by an artifact's module field.
    ///
    /// Only modules bound to splittable commands qualify; a module that must
    /// stay on this machine is never resolved from an artifact.
    pub fn untrusted_by_name(&self, module_name: &str) -> Result<&dyn UntrustedModule> {
        self.untrusted
            .iter()
            .filter(|(command, _)| {
                matches!(registry::task_kind(command), Ok(TaskKind::Untrusted))
            })
            .map(|(_, m)| m.as_ref())
            .find(|m| m.name() == module_name)
            .ok_or_else(|| DispatchError::ModuleNotFound(module_name.to_string()))
    }

    /// Bound command names with `true` for trusted bindings.
    pub fn commands(&self) -> impl Iterator<Item = (&str, bool)> {
        self.trusted
            .keys()
            .map(|c| (c.as_str(), true))
            .chain(self.untrusted.keys().map(|c| (c.as_str(), false)))
    }
}
