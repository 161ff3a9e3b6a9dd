//! Application environment definitions.
//!
//! This module provides the [`AppEnvironment`] enum selecting which block of
//! a region's endpoint table is active.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The environment the application is running in.
///
/// Each region in the endpoint table carries one set of URLs per
/// environment. The names match the keys used in the table.
///
/// # Example
///
/// ```rust
/// use lyst_network::AppEnvironment;
///
/// let env: AppEnvironment = "staging".parse().unwrap();
/// assert_eq!(env, AppEnvironment::Staging);
/// assert_eq!(env.to_string(), "Staging");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppEnvironment {
    /// Production builds.
    #[default]
    Release,
    /// Pre-production builds pointed at staging services.
    Staging,
    /// Local development builds.
    Debug,
}

impl AppEnvironment {
    /// Returns the environment's key in the endpoint table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Release => "Release",
            Self::Staging => "Staging",
            Self::Debug => "Debug",
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "release" => Ok(Self::Release),
            "staging" => Ok(Self::Staging),
            "debug" => Ok(Self::Debug),
            _ => Err(ConfigError::InvalidEnvironment {
                environment: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "RELEASE".parse::<AppEnvironment>().unwrap(),
            AppEnvironment::Release
        );
        assert_eq!(
            " Debug ".parse::<AppEnvironment>().unwrap(),
            AppEnvironment::Debug
        );
    }

    #[test]
    fn test_parse_rejects_unknown_environment() {
        let result = "production".parse::<AppEnvironment>();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvironment { environment }) if environment == "production"
        ));
    }

    #[test]
    fn test_display_matches_table_keys() {
        assert_eq!(AppEnvironment::Release.to_string(), "Release");
        assert_eq!(AppEnvironment::Staging.to_string(), "Staging");
        assert_eq!(AppEnvironment::Debug.to_string(), "Debug");
    }

    #[test]
    fn test_default_is_release() {
        assert_eq!(AppEnvironment::default(), AppEnvironment::Release);
    }
}
