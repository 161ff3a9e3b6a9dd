//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The API key sent in the `x-api-key` header.
///
/// The key is opaque to the network layer: the only check performed is that
/// it is non-empty. The `Debug` implementation masks the value so the key
/// never ends up in logs.
///
/// # Example
///
/// ```rust
/// use lyst_network::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// assert_eq!(format!("{:?}", key), "ApiKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(*****)")
    }
}

/// A deployment region, such as `uae` or `ksa`.
///
/// Regions select the top-level block of the endpoint table. They are
/// normalized to lowercase so lookups are case-insensitive.
///
/// # Example
///
/// ```rust
/// use lyst_network::Region;
///
/// let region = Region::new(" UAE ").unwrap();
/// assert_eq!(region.as_ref(), "uae");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    /// Creates a new validated region.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegion`] if the region is empty or
    /// contains whitespace.
    pub fn new(region: impl Into<String>) -> Result<Self, ConfigError> {
        let region = region.into();
        let normalized = region.trim().to_lowercase();

        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidRegion { region });
        }

        Ok(Self(normalized))
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}
