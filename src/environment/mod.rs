//! Environment policy: read-only questions about the execution context.
//!
//! Dispatch decisions never read process-wide configuration directly. They go
//! through an [`EnvironmentPolicy`] handle so tests and embedders can inject a
//! fixed view of the world:
//!
//! - [`ProcessEnvironment`] reads the live process environment on every call,
//!   with an optional override layer from the config file.
//! - [`EnvironmentSnapshot`] is an immutable key/value map.

mod platform;
mod process;
mod snapshot;

pub use platform::Platform;
pub use process::ProcessEnvironment;
pub use snapshot::EnvironmentSnapshot;

/// Key that marks a local development run.
pub const LOCAL_DEVELOPMENT: &str = "LOCAL_DEVELOPMENT";

/// Key that overrides the detected platform.
pub const PLATFORM: &str = "PLATFORM";

/// Read-only queries the dispatcher makes about its environment.
pub trait EnvironmentPolicy {
    /// Whether this is a developer's local run rather than a deployed bot.
    fn is_local_development(&self) -> bool;

    /// Raw value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Platform the current process runs on.
    fn platform(&self) -> Platform;

    /// Value for `key` interpreted as a boolean flag.
    fn get_bool(&self, key: &str) -> bool {
        self.get(key).as_deref().is_some_and(is_truthy)
    }
}

/// Interpret an environment value as a flag.
///
/// Empty strings and `0`/`false`/`no`/`off` (any case) are false; anything
/// else is true.
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
