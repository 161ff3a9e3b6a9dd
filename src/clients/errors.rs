//! Error types for request execution.
//!
//! This module contains the typed error delivered to callers, the
//! pre-dispatch request validation errors, and the error reported by a
//! [`Transport`](crate::clients::Transport).
//!
//! # Error Handling
//!
//! Every call resolves to exactly one of a decoded response or an
//! [`ApiError`]. The error's [`message`](ApiError::message) is meant for
//! display and its [`reason`](ApiError::reason) for programmatic branching:
//!
//! ```rust,ignore
//! use lyst_network::{ApiError, Reason};
//!
//! match executor.execute(&descriptor, &Json::<Profile>::new()).await {
//!     Ok(profile) => show(profile),
//!     Err(error) if error.reason() == Reason::Unauthorized => prompt_sign_in(),
//!     Err(error) => show_alert(error.message()),
//! }
//! ```
//!
//! No error is retried by this layer.

use std::fmt;

use thiserror::Error;

/// Status code used for failures signalled through the `succeeded` flag.
pub const REQUEST_TIMED_OUT_CODE: i32 = -1001;

/// The coarse category of an [`ApiError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// Business-level failure or a request that could not be built.
    Generic,
    /// The transport could not reach the server.
    NetworkConnectionError,
    /// The server answered with a non-2xx status.
    ServerError,
    /// The transport timed out, or the body reported `succeeded: false`.
    RequestTimeout,
    /// The server answered 401.
    Unauthorized,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::NetworkConnectionError => write!(f, "network_connection_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::RequestTimeout => write!(f, "request_timeout"),
            Self::Unauthorized => write!(f, "unauthorized"),
        }
    }
}

/// The typed error delivered when a call fails.
///
/// `ApiError` is immutable once constructed; read it through its accessors.
///
/// # Example
///
/// ```rust
/// use lyst_network::{ApiError, Reason};
///
/// let error = ApiError::server_error(503);
/// assert_eq!(error.status_code(), 503);
/// assert_eq!(error.reason(), Reason::ServerError);
/// assert_eq!(error.message(), "Server Error, Code: 503");
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    status_code: i32,
    message: String,
    reason: Reason,
    raw_response_body: String,
}

impl ApiError {
    /// Creates a new error.
    #[must_use]
    pub fn new(
        status_code: i32,
        message: impl Into<String>,
        reason: Reason,
        raw_response_body: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            message: message.into(),
            reason,
            raw_response_body: raw_response_body.into(),
        }
    }

    /// The error for a 401 response.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized Call", Reason::Unauthorized, "")
    }

    /// The error for a non-2xx response with no recognised failure body.
    #[must_use]
    pub fn server_error(code: u16) -> Self {
        Self::new(
            i32::from(code),
            format!("Server Error, Code: {code}"),
            Reason::ServerError,
            "",
        )
    }

    /// The error for a request the transport gave up waiting on.
    ///
    /// `status` is whatever status the transport saw, or `0`.
    #[must_use]
    pub fn request_timed_out(status: Option<u16>) -> Self {
        Self::new(
            status.map_or(0, i32::from),
            "Request Timeout",
            Reason::RequestTimeout,
            "",
        )
    }

    /// The error for a request whose endpoint could not be parsed.
    #[must_use]
    pub fn invalid_request() -> Self {
        Self::new(0, "Invalid Request", Reason::Generic, "")
    }

    /// Returns the status code.
    ///
    /// This is the HTTP status for most errors, the body's own `status` for
    /// validation failures, `-1001` for `succeeded: false` bodies and `0`
    /// when no response was received.
    #[must_use]
    pub const fn status_code(&self) -> i32 {
        self.status_code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error category.
    #[must_use]
    pub const fn reason(&self) -> Reason {
        self.reason
    }

    /// Returns the raw response payload attached by the server, if any.
    #[must_use]
    pub fn raw_response_body(&self) -> &str {
        &self.raw_response_body
    }
}

/// Error returned when a request descriptor cannot be turned into a wire request.
///
/// These are detected before anything is dispatched and surface to callers
/// as [`Reason::Generic`] errors with status code `0`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The endpoint is not a valid absolute URL.
    #[error("Invalid endpoint URL '{endpoint}'.")]
    InvalidEndpoint {
        /// The endpoint that failed to parse.
        endpoint: String,
    },

    /// A multipart request was dispatched without a binary payload.
    #[error("Cannot send a multipart request without form data.")]
    MissingBinaryPayload,

    /// A multipart request is missing one of its part descriptors.
    #[error("Cannot send a multipart request without a string '{field}' parameter.")]
    MissingMultipartField {
        /// The missing parameter name.
        field: &'static str,
    },

    /// Parameters could not be encoded.
    #[error("Failed to encode request parameters: {reason}")]
    Encoding {
        /// Why encoding failed.
        reason: String,
    },
}

impl From<InvalidHttpRequestError> for ApiError {
    fn from(error: InvalidHttpRequestError) -> Self {
        match error {
            InvalidHttpRequestError::InvalidEndpoint { .. } => Self::invalid_request(),
            other => Self::new(0, other.to_string(), Reason::Generic, ""),
        }
    }
}

/// The category of a [`TransportError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request timed out.
    TimedOut,
    /// The connection could not be established or was dropped.
    Connection,
    /// Any other transport failure.
    Other,
}

/// Error reported by a [`Transport`](crate::clients::Transport) when no
/// usable response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// What went wrong.
    pub kind: TransportErrorKind,
    /// The HTTP status, if the failure happened after headers were received.
    pub status: Option<u16>,
    /// Description of the failure.
    pub message: String,
}

impl TransportError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::TimedOut,
            status: None,
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Connection,
            status: None,
            message: message.into(),
        }
    }

    /// Creates an unclassified transport error.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Other,
            status: None,
            message: message.into(),
        }
    }

    /// Attaches the HTTP status seen before the failure.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns `true` if the transport timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::TimedOut
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        if error.is_timeout() {
            return Self::request_timed_out(error.status);
        }
        Self::new(
            error.status.map_or(0, i32::from),
            error.message,
            Reason::NetworkConnectionError,
            "",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_error_fields() {
        let error = ApiError::unauthorized();
        assert_eq!(error.status_code(), 401);
        assert_eq!(error.message(), "Unauthorized Call");
        assert_eq!(error.reason(), Reason::Unauthorized);
        assert_eq!(error.raw_response_body(), "");
    }

    #[test]
    fn test_server_error_message_includes_code() {
        let error = ApiError::server_error(502);
        assert_eq!(error.to_string(), "Server Error, Code: 502");
        assert_eq!(error.status_code(), 502);
    }

    #[test]
    fn test_invalid_request_error_fields() {
        let error = ApiError::invalid_request();
        assert_eq!(error.status_code(), 0);
        assert_eq!(error.message(), "Invalid Request");
        assert_eq!(error.reason(), Reason::Generic);
    }

    #[test]
    fn test_invalid_endpoint_maps_to_invalid_request() {
        let error: ApiError = InvalidHttpRequestError::InvalidEndpoint {
            endpoint: "not a url".to_string(),
        }
        .into();
        assert_eq!(error, ApiError::invalid_request());
    }

    #[test]
    fn test_missing_payload_maps_to_generic_configuration_error() {
        let error: ApiError = InvalidHttpRequestError::MissingBinaryPayload.into();
        assert_eq!(error.status_code(), 0);
        assert_eq!(error.reason(), Reason::Generic);
        assert!(error.message().contains("form data"));
    }

    #[test]
    fn test_timeout_transport_error_maps_to_request_timeout() {
        let error: ApiError = TransportError::timed_out("operation timed out").into();
        assert_eq!(error.reason(), Reason::RequestTimeout);
        assert_eq!(error.status_code(), 0);

        let error: ApiError = TransportError::timed_out("body timed out")
            .with_status(200)
            .into();
        assert_eq!(error.reason(), Reason::RequestTimeout);
        assert_eq!(error.status_code(), 200);
    }

    #[test]
    fn test_connection_transport_error_maps_to_network_error() {
        let error: ApiError = TransportError::connection("connection refused").into();
        assert_eq!(error.reason(), Reason::NetworkConnectionError);
        assert_eq!(error.status_code(), 0);
        assert_eq!(error.message(), "connection refused");
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(Reason::Generic.to_string(), "generic");
        assert_eq!(Reason::RequestTimeout.to_string(), "request_timeout");
        assert_eq!(Reason::Unauthorized.to_string(), "unauthorized");
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let api_error: &dyn std::error::Error = &ApiError::unauthorized();
        let _ = api_error;

        let invalid: &dyn std::error::Error = &InvalidHttpRequestError::MissingBinaryPayload;
        let _ = invalid;

        let transport: &dyn std::error::Error = &TransportError::other("boom");
        let _ = transport;
    }
}
