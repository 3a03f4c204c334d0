//! Immutable environment snapshot.

use super::{EnvironmentPolicy, LOCAL_DEVELOPMENT, Platform};
use std::collections::BTreeMap;

/// A fixed set of environment values and a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    values: BTreeMap<String, String>,
    platform: Platform,
}

impl EnvironmentSnapshot {
    pub fn new(platform: Platform) -> Self {
        Self {
            values: BTreeMap::new(),
            platform,
        }
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Return a copy with `key` removed.
    pub fn without(mut self, key: &str) -> Self {
        self.values.remove(key);
        self
    }

    /// Return a copy on a different platform.
    pub fn on(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

impl EnvironmentPolicy for EnvironmentSnapshot {
    fn is_local_development(&self) -> bool {
        self.get_bool(LOCAL_DEVELOPMENT)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
