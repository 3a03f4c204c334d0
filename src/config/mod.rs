//! Configuration model for utask.
//!
//! This module defines the Config struct that represents `utask.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! defaults for every field, and validation of config values.

mod model;
mod operations;
pub mod types;


pub use model::{Config, DEFAULT_CONFIG_FILE};
pub use types::ModuleConfig;
