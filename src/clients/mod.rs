//! Request execution for the Lyst backend.
//!
//! This module turns a [`RequestDescriptor`] into an HTTP exchange and
//! routes the outcome into either a decoded value or an [`ApiError`].
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`RequestDescriptor`]: Everything needed to perform one call
//! - [`RequestExecutor`]: Builds, dispatches and classifies calls
//! - [`Transport`]: The HTTP capability consumed by the executor
//! - [`ReqwestTransport`]: The production transport
//! - [`ErrorClassifier`]: Turns failure bodies into [`ApiError`]s
//! - [`ResponseBuilder`]: Decodes a validated JSON payload
//! - [`ApiError`] and [`Reason`]: The typed failure delivered to callers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lyst_network::{HttpMethod, Json, RequestDescriptor, RequestExecutor};
//!
//! let executor = RequestExecutor::new(credentials, Arc::new(transport));
//!
//! let descriptor = RequestDescriptor::builder(HttpMethod::Get, "https://api.example.com/dogs")
//!     .parameter("page", 2)
//!     .build();
//!
//! let dogs: Vec<Dog> = executor.execute(&descriptor, &Json::new()).await?;
//! ```
//!
//! # Retry Behavior
//!
//! None. Every failure is terminal for the call that produced it.

mod classifier;
mod encoding;
mod errors;
mod executor;
mod http_client;
mod http_request;
mod http_response;
mod multipart;
mod response_builder;
mod transport;

pub use classifier::{is_success, validate_response, BackendErrorClassifier, ErrorClassifier};
pub use encoding::{
    query_string, select_encoding, EncodedParameters, ParameterEncoder, ParameterEncoding,
    FORM_URL_ENCODED_CONTENT_TYPE, JSON_CONTENT_TYPE,
};
pub use errors::{
    ApiError, InvalidHttpRequestError, Reason, TransportError, TransportErrorKind,
    REQUEST_TIMED_OUT_CODE,
};
pub use executor::{AuthorizationPolicy, RequestExecutor, API_KEY_HEADER};
pub use http_client::{ReqwestTransport, SDK_VERSION};
pub use http_request::{HttpMethod, Parameters, RequestDescriptor, RequestDescriptorBuilder};
pub use http_response::TransportResponse;
pub use multipart::{build_parts, MultipartPart, FILE_NAME_KEY, MIME_TYPE_KEY, WITH_NAME_KEY};
pub use response_builder::{DecodeError, Json, RawJson, ResponseBuilder};
pub use transport::{RequestBody, Transport, TransportRequest};
