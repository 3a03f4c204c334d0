//! Artifact store backed by JSON files in a directory.

use super::ArtifactStore;
use crate::error::{DispatchError, Result};
use crate::fs::atomic_write_file;
use crate::task::{UworkerInput, UworkerOutput};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Stores artifacts as `{root}/inputs/*.json` and `{root}/outputs/*.json`.
///
/// References are the file paths, so any machine sharing the directory can
/// load them.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn next_path(&self, kind: &str, module: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%6f");
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let file = format!(
            "{}-{}-{}-{}.json",
            sanitize(module),
            stamp,
            std::process::id(),
            seq
        );
        self.root.join(kind).join(file)
    }

    fn write<T: Serialize>(&self, kind: &str, module: &str, value: &T) -> Result<String> {
        let path = self.next_path(kind, module);
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            DispatchError::Artifact(format!("failed to serialize {} artifact: {}", kind, e))
        })?;
        atomic_write_file(&path, &json)?;
        Ok(path.to_string_lossy().into_owned())
    }

    fn read<T: DeserializeOwned>(&self, reference: &str) -> Result<T> {
        let content = std::fs::read_to_string(reference).map_err(|e| {
            DispatchError::Artifact(format!("failed to read artifact '{}': {}", reference, e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DispatchError::Artifact(format!("failed to parse artifact '{}': {}", reference, e))
        })
    }
}

impl ArtifactStore for FsArtifactStore {
    fn store_input(&self, input: &UworkerInput) -> Result<String> {
        self.write("inputs", &input.module, input)
    }

    fn load_input(&self, reference: &str) -> Result<UworkerInput> {
        self.read(reference)
    }

    fn store_output(&self, output: &UworkerOutput) -> Result<String> {
        self.write("outputs", &output.module, output)
    }

    fn load_output(&self, reference: &str) -> Result<UworkerOutput> {
        self.read(reference)
    }
}

/// Keep module names filesystem-safe.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
