//! Filesystem utilities for utask.
//!
//! Artifacts are handed between machines through files, so writes are atomic:
//! a reader never sees a partially written artifact.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
