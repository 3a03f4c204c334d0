//! utask: trust-boundary task dispatcher.
//!
//! Decides, per task invocation, whether work runs entirely on this trusted
//! machine or is split into a trusted preprocess, an untrusted main phase that
//! may be offloaded to a batch worker, and a trusted postprocess.
//!
//! - [`registry`] maps command names to execution contracts.
//! - [`execution_mode`] decides local vs remote from an [`environment`] policy.
//! - [`dispatch`] runs the contract; [`pipeline`] runs the phases.
//! - [`artifacts`] and [`remote`] are the storage and batch-backend seams.

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod events;
pub mod execution_mode;
pub mod exit_codes;
pub mod fs;
pub mod modules;
pub mod pipeline;
pub mod process;
pub mod registry;
pub mod remote;
pub mod task;
pub mod template;

#[cfg(test)]
mod test_support;
