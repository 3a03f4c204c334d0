//! Recording stubs shared by unit tests.

use crate::artifacts::ArtifactStore;
use crate::error::{DispatchError, Result};
use crate::remote::BatchBackend;
use crate::task::{TrustedModule, UntrustedModule, UworkerEnv, UworkerInput, UworkerOutput};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Trusted module that records each `run` call.
pub(crate) struct StubTrusted {
    name: String,
    fail: bool,
    runs: Rc<RefCell<Vec<(String, String)>>>,
}

impl StubTrusted {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            runs: Rc::default(),
        }
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub(crate) fn runs(&self) -> Rc<RefCell<Vec<(String, String)>>> {
        Rc::clone(&self.runs)
    }
}

impl TrustedModule for StubTrusted {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, task_argument: &str, job_type: &str) -> Result<()> {
        self.runs
            .borrow_mut()
            .push((task_argument.to_string(), job_type.to_string()));
        if self.fail {
            return Err(DispatchError::module(&self.name, "run", "stub failure"));
        }
        Ok(())
    }
}

/// Arguments seen by each phase of a [`StubUntrusted`].
#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub(crate) preprocess: Vec<(String, String, UworkerEnv)>,
    pub(crate) main: Vec<UworkerInput>,
    pub(crate) postprocess: Vec<(UworkerOutput, UworkerInput)>,
}

/// Untrusted module with canned phase results that records its calls.
pub(crate) struct StubUntrusted {
    name: String,
    input: Option<Value>,
    output: Option<Value>,
    failing_phase: Option<&'static str>,
    calls: Rc<RefCell<Calls>>,
}

impl StubUntrusted {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input: Some(json!({})),
            output: Some(json!({})),
            failing_phase: None,
            calls: Rc::default(),
        }
    }

    pub(crate) fn with_input(mut self, input: Option<Value>) -> Self {
        self.input = input;
        self
    }

    pub(crate) fn with_output(mut self, output: Option<Value>) -> Self {
        self.output = output;
        self
    }

    pub(crate) fn failing_in(mut self, phase: &'static str) -> Self {
        self.failing_phase = Some(phase);
        self
    }

    pub(crate) fn calls(&self) -> Rc<RefCell<Calls>> {
        Rc::clone(&self.calls)
    }

    fn check(&self, phase: &str) -> Result<()> {
        if self.failing_phase == Some(phase) {
            return Err(DispatchError::module(&self.name, phase, "stub failure"));
        }
        Ok(())
    }
}

impl UntrustedModule for StubUntrusted {
    fn name(&self) -> &str {
        &self.name
    }

    fn preprocess(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &UworkerEnv,
    ) -> Result<Option<Value>> {
        self.calls.borrow_mut().preprocess.push((
            task_argument.to_string(),
            job_type.to_string(),
            uworker_env.clone(),
        ));
        self.check("preprocess")?;
        Ok(self.input.clone())
    }

    fn main(&self, input: &UworkerInput) -> Result<Option<Value>> {
        self.calls.borrow_mut().main.push(input.clone());
        self.check("main")?;
        Ok(self.output.clone())
    }

    fn postprocess(&self, output: &UworkerOutput, input: &UworkerInput) -> Result<()> {
        self.calls
            .borrow_mut()
            .postprocess
            .push((output.clone(), input.clone()));
        self.check("postprocess")
    }
}

/// In-memory artifact store with `mem://` references.
#[derive(Default)]
pub(crate) struct MemoryArtifactStore {
    inputs: RefCell<BTreeMap<String, UworkerInput>>,
    outputs: RefCell<BTreeMap<String, UworkerOutput>>,
    next: Cell<u64>,
    blank_references: bool,
}

impl MemoryArtifactStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A store that accepts inputs but hands back empty references.
    pub(crate) fn with_blank_references() -> Self {
        Self {
            blank_references: true,
            ..Self::default()
        }
    }

    pub(crate) fn input_count(&self) -> usize {
        self.inputs.borrow().len()
    }

    pub(crate) fn output_count(&self) -> usize {
        self.outputs.borrow().len()
    }

    fn reference(&self, kind: &str) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("mem://{}/{}", kind, n)
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn store_input(&self, input: &UworkerInput) -> Result<String> {
        let reference = self.reference("inputs");
        self.inputs
            .borrow_mut()
            .insert(reference.clone(), input.clone());
        if self.blank_references {
            return Ok(String::new());
        }
        Ok(reference)
    }

    fn load_input(&self, reference: &str) -> Result<UworkerInput> {
        self.inputs
            .borrow()
            .get(reference)
            .cloned()
            .ok_or_else(|| DispatchError::Artifact(format!("no input at '{}'", reference)))
    }

    fn store_output(&self, output: &UworkerOutput) -> Result<String> {
        let reference = self.reference("outputs");
        self.outputs
            .borrow_mut()
            .insert(reference.clone(), output.clone());
        Ok(reference)
    }

    fn load_output(&self, reference: &str) -> Result<UworkerOutput> {
        self.outputs
            .borrow()
            .get(reference)
            .cloned()
            .ok_or_else(|| DispatchError::Artifact(format!("no output at '{}'", reference)))
    }
}

/// One accepted `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Submission {
    pub(crate) module: String,
    pub(crate) job_type: String,
    pub(crate) input_reference: String,
}

/// Batch backend that records submissions, or rejects them all.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    reject: bool,
    submissions: RefCell<Vec<Submission>>,
    attempts: Cell<usize>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub(crate) fn submissions(&self) -> Vec<Submission> {
        self.submissions.borrow().clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl BatchBackend for RecordingBackend {
    fn submit(&self, module_name: &str, job_type: &str, input_reference: &str) -> Result<()> {
        self.attempts.set(self.attempts.get() + 1);
        if self.reject {
            return Err(DispatchError::Submission("backend unavailable".to_string()));
        }
        self.submissions.borrow_mut().push(Submission {
            module: module_name.to_string(),
            job_type: job_type.to_string(),
            input_reference: input_reference.to_string(),
        });
        Ok(())
    }
}
