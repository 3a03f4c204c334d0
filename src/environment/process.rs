//! Live process environment with a config-supplied override layer.

use super::{EnvironmentPolicy, LOCAL_DEVELOPMENT, PLATFORM, Platform};
use std::collections::BTreeMap;
use tracing::warn;

/// Environment policy backed by `std::env`.
///
/// Nothing is cached: every query reads the process environment again, so a
/// flag flipped between two calls takes effect on the second one.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnvironment {
    overrides: BTreeMap<String, String>,
}

impl ProcessEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer fixed values over the process environment. Overrides win.
    pub fn with_overrides(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }
}

impl EnvironmentPolicy for ProcessEnvironment {
    fn is_local_development(&self) -> bool {
        self.get_bool(LOCAL_DEVELOPMENT)
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(key) {
            return Some(value.clone());
        }
        std::env::var(key).ok()
    }

    fn platform(&self) -> Platform {
        match self.get(PLATFORM) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!(%value, error = %e, "ignoring unrecognized PLATFORM override");
                Platform::current()
            }),
            None => Platform::current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEY: &str = "UTASK_PROCESS_ENV_TEST_KEY";

    fn set(key: &str, value: &str) {
        // SAFETY: serialized tests; no other thread touches the environment.
        unsafe { std::env::set_var(key, value) };
    }

    fn unset(key: &str) {
        // SAFETY: serialized tests; no other thread touches the environment.
        unsafe { std::env::remove_var(key) };
    }

    #[test]
    #[serial]
    fn reads_live_environment_each_call() {
        let env = ProcessEnvironment::new();
        unset(KEY);
        assert_eq!(env.get(KEY), None);

        set(KEY, "first");
        assert_eq!(env.get(KEY).as_deref(), Some("first"));

        set(KEY, "second");
        assert_eq!(env.get(KEY).as_deref(), Some("second"));
        unset(KEY);
    }

    #[test]
    #[serial]
    fn overrides_take_precedence() {
        set(KEY, "process");
        let env = ProcessEnvironment::with_overrides(BTreeMap::from([(
            KEY.to_string(),
            "override".to_string(),
        )]));
        assert_eq!(env.get(KEY).as_deref(), Some("override"));
        unset(KEY);
    }

    #[test]
    #[serial]
    fn platform_override() {
        let env = ProcessEnvironment::with_overrides(BTreeMap::from([(
            PLATFORM.to_string(),
            "WINDOWS".to_string(),
        )]));
        assert_eq!(env.platform(), Platform::Windows);
    }

    #[test]
    #[serial]
    fn invalid_platform_falls_back_to_current() {
        let env = ProcessEnvironment::with_overrides(BTreeMap::from([(
            PLATFORM.to_string(),
            "beos".to_string(),
        )]));
        assert_eq!(env.platform(), Platform::current());
    }

    #[test]
    #[serial]
    fn local_development_flag() {
        let env = ProcessEnvironment::new();
        unset(LOCAL_DEVELOPMENT);
        assert!(!env.is_local_development());
        set(LOCAL_DEVELOPMENT, "True");
        assert!(env.is_local_development());
        unset(LOCAL_DEVELOPMENT);
    }
}
