//! Configuration error types for the network layer.
//!
//! This module contains the error type used while building configuration
//! values: credentials, regions, environments and endpoint tables. Errors
//! raised while executing a request are [`ApiError`](crate::ApiError)s and
//! live in [`clients`](crate::clients).
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use lyst_network::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while building network configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid API key.")]
    EmptyApiKey,

    /// Region identifier is invalid.
    #[error("Invalid region '{region}'. Expected a non-empty region code such as 'uae'.")]
    InvalidRegion {
        /// The invalid region that was provided.
        region: String,
    },

    /// Environment name is invalid.
    #[error("Invalid environment '{environment}'. Expected one of 'Release', 'Staging' or 'Debug'.")]
    InvalidEnvironment {
        /// The invalid environment name that was provided.
        environment: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The endpoint table could not be parsed.
    #[error("Invalid endpoint table: {reason}")]
    InvalidEndpointTable {
        /// Why the table was rejected.
        reason: String,
    },

    /// No endpoint is configured for the requested key.
    #[error("No <{key}> setting has been found for region '{region}' in environment '{environment}'.")]
    MissingEndpoint {
        /// The endpoint key that was looked up.
        key: String,
        /// The active region.
        region: String,
        /// The active environment.
        environment: String,
    },

    /// The HTTP client backing a transport could not be created.
    #[error("Failed to create HTTP client: {reason}")]
    HttpClient {
        /// The underlying failure.
        reason: String,
    },
}
