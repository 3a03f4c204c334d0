//! Platform identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platforms a bot can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Linux,
    Mac,
    Windows,
    Android,
    Fuchsia,
    #[serde(rename = "CHROMEOS")]
    ChromeOs,
}

impl Platform {
    /// Platform of the compile target.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::Mac,
            "windows" => Platform::Windows,
            "android" => Platform::Android,
            "fuchsia" => Platform::Fuchsia,
            _ => Platform::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "LINUX",
            Platform::Mac => "MAC",
            Platform::Windows => "WINDOWS",
            Platform::Android => "ANDROID",
            Platform::Fuchsia => "FUCHSIA",
            Platform::ChromeOs => "CHROMEOS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LINUX" => Ok(Platform::Linux),
            "MAC" | "MACOS" | "DARWIN" => Ok(Platform::Mac),
            "WINDOWS" => Ok(Platform::Windows),
            "ANDROID" => Ok(Platform::Android),
            "FUCHSIA" => Ok(Platform::Fuchsia),
            "CHROMEOS" => Ok(Platform::ChromeOs),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("linux".parse::<Platform>().unwrap(), Platform::Linux);
        assert_eq!("Mac".parse::<Platform>().unwrap(), Platform::Mac);
        assert_eq!("darwin".parse::<Platform>().unwrap(), Platform::Mac);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "plan9".parse::<Platform>().unwrap_err();
        assert!(err.contains("PLAN9"));
    }

    #[test]
    fn display_matches_parse() {
        for platform in [
            Platform::Linux,
            Platform::Mac,
            Platform::Windows,
            Platform::Android,
            Platform::Fuchsia,
            Platform::ChromeOs,
        ] {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Platform::ChromeOs).unwrap();
        assert_eq!(json, "\"CHROMEOS\"");
        let parsed: Platform = serde_json::from_str("\"LINUX\"").unwrap();
        assert_eq!(parsed, Platform::Linux);
    }
}
