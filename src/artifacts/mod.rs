//! Persistence of hand-off artifacts between split phases.
//!
//! The I/O-mediated pipeline stores each artifact and passes only its
//! reference (a path or URL) to the next phase, which may run on another
//! machine at another time.

mod fs_store;

pub use fs_store::FsArtifactStore;

use crate::error::Result;
use crate::task::{UworkerInput, UworkerOutput};

/// External storage for uworker inputs and outputs.
pub trait ArtifactStore {
    /// Persist an input and return a reference to it.
    fn store_input(&self, input: &UworkerInput) -> Result<String>;

    fn load_input(&self, reference: &str) -> Result<UworkerInput>;

    /// Persist an output and return a reference to it.
    fn store_output(&self, output: &UworkerOutput) -> Result<String>;

    fn load_output(&self, reference: &str) -> Result<UworkerOutput>;
}
