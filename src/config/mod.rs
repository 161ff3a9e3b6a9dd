//! Configuration types for the network layer.
//!
//! This module provides the configuration value that replaces a process-wide
//! settings singleton: it is built once at startup and passed explicitly to
//! whatever builds request descriptors and transports.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`NetworkConfig`]: The configuration struct holding region, environment and endpoints
//! - [`NetworkConfigBuilder`]: A builder for constructing [`NetworkConfig`] instances
//! - [`EndpointTable`]: The `region -> environment -> key -> url` lookup table
//! - [`ApiKey`]: The API key newtype with masked debug output
//! - [`Region`]: A validated region code
//! - [`AppEnvironment`]: The active environment
//!
//! # Example
//!
//! ```rust
//! use lyst_network::{AppEnvironment, EndpointTable, NetworkConfig, Region};
//!
//! let region = Region::new("uae").unwrap();
//! let endpoints = EndpointTable::new().with_endpoint(
//!     &region,
//!     AppEnvironment::Staging,
//!     "dogURL",
//!     "https://staging.example.com/dogs",
//! );
//!
//! let config = NetworkConfig::builder()
//!     .region(region)
//!     .environment(AppEnvironment::Staging)
//!     .endpoints(endpoints)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.url_for("dogURL").unwrap(), "https://staging.example.com/dogs");
//! ```

mod endpoints;
mod environment;
mod newtypes;

pub use endpoints::EndpointTable;
pub use environment::AppEnvironment;
pub use newtypes::{ApiKey, Region};

use std::time::Duration;

use crate::clients::{HttpMethod, RequestDescriptor, RequestDescriptorBuilder};
use crate::error::ConfigError;

/// Configuration for the network layer.
///
/// # Thread Safety
///
/// `NetworkConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    environment: AppEnvironment,
    region: Region,
    endpoints: EndpointTable,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl NetworkConfig {
    /// Creates a new builder for constructing a `NetworkConfig`.
    #[must_use]
    pub fn builder() -> NetworkConfigBuilder {
        NetworkConfigBuilder::new()
    }

    /// Returns the active environment.
    #[must_use]
    pub const fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Returns the active region.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Returns the endpoint table.
    #[must_use]
    pub const fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the transport timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolves the URL for `key` in the active region and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEndpoint`] if the key is not configured.
    pub fn url_for(&self, key: &str) -> Result<String, ConfigError> {
        self.endpoints
            .resolve(&self.region, self.environment, key)
            .map(String::from)
    }

    /// Starts a [`RequestDescriptor`] for the endpoint configured under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEndpoint`] if the key is not configured.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lyst_network::{AppEnvironment, EndpointTable, HttpMethod, NetworkConfig, Region};
    ///
    /// let region = Region::new("uae").unwrap();
    /// let config = NetworkConfig::builder()
    ///     .region(region.clone())
    ///     .endpoints(EndpointTable::new().with_endpoint(
    ///         &region,
    ///         AppEnvironment::Release,
    ///         "dogURL",
    ///         "https://api.example.com/dogs",
    ///     ))
    ///     .build()
    ///     .unwrap();
    ///
    /// let descriptor = config
    ///     .descriptor("dogURL", HttpMethod::Post)
    ///     .unwrap()
    ///     .parameter("name", "Rex")
    ///     .build();
    ///
    /// assert_eq!(descriptor.endpoint(), "https://api.example.com/dogs");
    /// ```
    pub fn descriptor(
        &self,
        key: &str,
        method: HttpMethod,
    ) -> Result<RequestDescriptorBuilder, ConfigError> {
        let url = self.url_for(key)?;
        Ok(RequestDescriptor::builder(method, url))
    }
}

// Verify NetworkConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NetworkConfig>();
};

/// Builder for constructing [`NetworkConfig`] instances.
///
/// The only required field is `region`.
///
/// # Defaults
///
/// - `environment`: [`AppEnvironment::Release`]
/// - `endpoints`: empty table
/// - `user_agent_prefix`: `None`
/// - `timeout`: `None` (no timeout imposed)
#[derive(Debug, Default)]
pub struct NetworkConfigBuilder {
    environment: Option<AppEnvironment>,
    region: Option<Region>,
    endpoints: Option<EndpointTable>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl NetworkConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment.
    #[must_use]
    pub const fn environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the region (required).
    #[must_use]
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets the endpoint table.
    #[must_use]
    pub fn endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets a timeout applied by the HTTP transport.
    ///
    /// Expired requests are reported as [`Reason::RequestTimeout`](crate::Reason::RequestTimeout).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`NetworkConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `region` is not set.
    pub fn build(self) -> Result<NetworkConfig, ConfigError> {
        let region = self
            .region
            .ok_or(ConfigError::MissingRequiredField { field: "region" })?;

        Ok(NetworkConfig {
            environment: self.environment.unwrap_or_default(),
            region,
            endpoints: self.endpoints.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uae() -> Region {
        Region::new("uae").unwrap()
    }

    #[test]
    fn test_builder_requires_region() {
        let result = NetworkConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "region" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = NetworkConfig::builder().region(uae()).build().unwrap();

        assert_eq!(config.environment(), AppEnvironment::Release);
        assert!(config.endpoints().is_empty());
        assert!(config.user_agent_prefix().is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_url_for_uses_active_region_and_environment() {
        let endpoints = EndpointTable::new()
            .with_endpoint(&uae(), AppEnvironment::Release, "dogURL", "https://prod/dogs")
            .with_endpoint(&uae(), AppEnvironment::Debug, "dogURL", "http://local/dogs");

        let config = NetworkConfig::builder()
            .region(uae())
            .environment(AppEnvironment::Debug)
            .endpoints(endpoints)
            .build()
            .unwrap();

        assert_eq!(config.url_for("dogURL").unwrap(), "http://local/dogs");
    }

    #[test]
    fn test_url_for_missing_key_is_an_error() {
        let config = NetworkConfig::builder().region(uae()).build().unwrap();

        assert!(matches!(
            config.url_for("apiKey"),
            Err(ConfigError::MissingEndpoint { .. })
        ));
    }

    #[test]
    fn test_descriptor_starts_from_resolved_url() {
        let config = NetworkConfig::builder()
            .region(uae())
            .endpoints(EndpointTable::new().with_endpoint(
                &uae(),
                AppEnvironment::Release,
                "dogURL",
                "https://prod/dogs",
            ))
            .build()
            .unwrap();

        let descriptor = config.descriptor("dogURL", HttpMethod::Get).unwrap().build();

        assert_eq!(descriptor.endpoint(), "https://prod/dogs");
        assert_eq!(descriptor.method(), HttpMethod::Get);
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = NetworkConfig::builder()
            .region(uae())
            .environment(AppEnvironment::Staging)
            .user_agent_prefix("LystApp/2.1")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(config.environment(), AppEnvironment::Staging);
        assert_eq!(config.user_agent_prefix(), Some("LystApp/2.1"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NetworkConfig>();
    }
}
