//! # Lyst Network
//!
//! An HTTP client layer for the Lyst backend: region-aware endpoint
//! configuration, request descriptors, credential injection, parameter
//! encoding, and a uniform error taxonomy for every call.
//!
//! ## Overview
//!
//! This crate provides:
//! - Region and environment aware configuration via [`NetworkConfig`] and [`NetworkConfigBuilder`]
//! - Validated newtypes for the API key and region
//! - Declarative request descriptors via [`RequestDescriptor`]
//! - Standard, top-level JSON array, and multipart request shapes
//! - API key injection from a pluggable [`CredentialProvider`]
//! - Backend failure body classification via [`ErrorClassifier`]
//! - A typed [`ApiError`] for every failure, never retried
//!
//! ## Quick Start
//!
//! ```rust
//! use lyst_network::{AppEnvironment, EndpointTable, HttpMethod, NetworkConfig, Region};
//!
//! let region = Region::new("uae").unwrap();
//! let endpoints = EndpointTable::new().with_endpoint(
//!     &region,
//!     AppEnvironment::Release,
//!     "dogURL",
//!     "https://api.example.com/dogs",
//! );
//!
//! let config = NetworkConfig::builder()
//!     .region(region)
//!     .endpoints(endpoints)
//!     .build()
//!     .unwrap();
//!
//! let descriptor = config
//!     .descriptor("dogURL", HttpMethod::Get)
//!     .unwrap()
//!     .parameter("page", 2)
//!     .build();
//!
//! assert_eq!(descriptor.endpoint(), "https://api.example.com/dogs");
//! ```
//!
//! ## Executing Calls
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lyst_network::{
//!     ApiKey, Json, MemoryCredentialStore, Reason, RequestExecutor, ReqwestTransport,
//! };
//!
//! let store = Arc::new(MemoryCredentialStore::with_key(ApiKey::new("K1")?));
//! let transport = Arc::new(ReqwestTransport::new(Some(&config))?);
//! let executor = RequestExecutor::new(store, transport);
//!
//! match executor.execute(&descriptor, &Json::<Vec<Dog>>::new()).await {
//!     Ok(dogs) => render(dogs),
//!     Err(error) if error.reason() == Reason::Unauthorized => sign_in(),
//!     Err(error) => alert(error.message()),
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and credentials are passed explicitly
//! - **Fail-fast validation**: newtypes and builders reject bad input on construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for the Tokio runtime

pub mod clients;
pub mod config;
pub mod credentials;
pub mod error;

// Re-export public types at crate root for convenience
pub use config::{
    ApiKey, AppEnvironment, EndpointTable, NetworkConfig, NetworkConfigBuilder, Region,
};
pub use credentials::{CredentialProvider, MemoryCredentialStore};
pub use error::ConfigError;

// Re-export client types
pub use clients::{
    ApiError, AuthorizationPolicy, BackendErrorClassifier, DecodeError, ErrorClassifier,
    HttpMethod, InvalidHttpRequestError, Json, ParameterEncoding, Parameters, RawJson, Reason,
    RequestDescriptor, RequestDescriptorBuilder, RequestExecutor, ReqwestTransport,
    ResponseBuilder, Transport, TransportError, TransportRequest, TransportResponse,
};
