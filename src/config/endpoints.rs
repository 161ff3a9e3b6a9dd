//! Per-region, per-environment endpoint tables.
//!
//! Endpoint URLs are organised as `region -> environment -> key -> url`.
//! Tables are usually shipped as JSON alongside the application:
//!
//! ```json
//! {
//!   "uae": {
//!     "Release": { "apiKey": "https://api.example.com/key", "dogURL": "https://api.example.com/dogs" },
//!     "Staging": { "apiKey": "https://staging.example.com/key" }
//!   }
//! }
//! ```

use std::collections::HashMap;

use crate::config::{AppEnvironment, Region};
use crate::error::ConfigError;

type EnvironmentBlock = HashMap<String, HashMap<String, String>>;

/// A lookup table of endpoint URLs.
///
/// # Example
///
/// ```rust
/// use lyst_network::{AppEnvironment, EndpointTable, Region};
///
/// let table = EndpointTable::from_json(
///     r#"{"UAE": {"Staging": {"dogURL": "https://staging.example.com/dogs"}}}"#,
/// )
/// .unwrap();
///
/// let region = Region::new("uae").unwrap();
/// let url = table.resolve(&region, AppEnvironment::Staging, "dogURL").unwrap();
/// assert_eq!(url, "https://staging.example.com/dogs");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointTable {
    regions: HashMap<String, EnvironmentBlock>,
}

impl EndpointTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a table from its JSON representation.
    ///
    /// Region keys are normalized to lowercase to match [`Region`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpointTable`] if the JSON does not
    /// have the `region -> environment -> key -> url` shape.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, EnvironmentBlock> =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidEndpointTable {
                reason: e.to_string(),
            })?;

        let regions = raw
            .into_iter()
            .map(|(region, block)| (region.trim().to_lowercase(), block))
            .collect();

        Ok(Self { regions })
    }

    /// Adds or replaces a single endpoint.
    #[must_use]
    pub fn with_endpoint(
        mut self,
        region: &Region,
        environment: AppEnvironment,
        key: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.regions
            .entry(region.as_ref().to_string())
            .or_default()
            .entry(environment.as_str().to_string())
            .or_default()
            .insert(key.into(), url.into());
        self
    }

    /// Looks up the URL configured for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEndpoint`] if the region, the
    /// environment or the key is not present in the table.
    pub fn resolve(
        &self,
        region: &Region,
        environment: AppEnvironment,
        key: &str,
    ) -> Result<&str, ConfigError> {
        self.regions
            .get(region.as_ref())
            .and_then(|block| block.get(environment.as_str()))
            .and_then(|urls| urls.get(key))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingEndpoint {
                key: key.to_string(),
                region: region.to_string(),
                environment: environment.to_string(),
            })
    }

    /// Returns `true` if the table contains no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
