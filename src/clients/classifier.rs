//! Body-level error classification and response validation.
//!
//! A response can fail even with a 2xx status: the API reports business
//! failures in the JSON body. [`BackendErrorClassifier`] recognises three
//! body shapes, tried in this fixed order with the first match winning:
//!
//! 1. validation errors: `{"status": 422, "errors": {"email": ["is invalid"]}}`
//! 2. exceptions: `{"error": "boom", "responseObject": "trace-1"}`
//! 3. failure flags: `{"succeeded": false, "message": "nope"}`
//!
//! A body matching more than one shape is classified by the earliest one.

use serde_json::{Map, Value};

use crate::clients::errors::{ApiError, Reason, REQUEST_TIMED_OUT_CODE};

/// Inspects a response and produces a typed error if it represents a failure.
///
/// Implementations must be pure: classifying the same input twice yields
/// equal results.
pub trait ErrorClassifier: Send + Sync {
    /// Classifies a response body.
    ///
    /// `body` is `None` when the response carried no payload.
    fn classify(&self, body: Option<&[u8]>, status: u16) -> Option<ApiError>;
}

/// The classifier for the backend's JSON error conventions.
///
/// # Example
///
/// ```rust
/// use lyst_network::{BackendErrorClassifier, ErrorClassifier, Reason};
///
/// let body = br#"{"succeeded": false, "message": "nope"}"#;
/// let error = BackendErrorClassifier.classify(Some(body), 200).unwrap();
///
/// assert_eq!(error.status_code(), -1001);
/// assert_eq!(error.message(), "nope");
/// assert_eq!(error.reason(), Reason::RequestTimeout);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BackendErrorClassifier;

impl ErrorClassifier for BackendErrorClassifier {
    fn classify(&self, body: Option<&[u8]>, status: u16) -> Option<ApiError> {
        let Some(json) = body.and_then(parse_object) else {
            return (!is_success(status)).then(|| ApiError::server_error(status));
        };

        validation_error(&json)
            .or_else(|| exception(&json, status))
            .or_else(|| failure(&json))
    }
}

/// Returns `true` for statuses in `200..=299`.
#[must_use]
pub const fn is_success(status: u16) -> bool {
    matches!(status, 200..=299)
}

/// Decides whether a response may be handed to the caller.
///
/// A classifier error wins; otherwise a status outside `200..=299` fails
/// with [`ApiError::server_error`].
///
/// # Errors
///
/// Returns the [`ApiError`] describing the failure.
pub fn validate_response(
    classifier: &dyn ErrorClassifier,
    status: u16,
    body: Option<&[u8]>,
) -> Result<(), ApiError> {
    if let Some(error) = classifier.classify(body, status) {
        return Err(error);
    }

    if !is_success(status) {
        return Err(ApiError::server_error(status));
    }

    Ok(())
}

fn parse_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn validation_error(json: &Map<String, Value>) -> Option<ApiError> {
    let status = json
        .get("status")
        .and_then(Value::as_i64)
        .and_then(|s| i32::try_from(s).ok())?;
    let errors = json.get("errors").and_then(Value::as_object)?;

    let mut messages = Vec::new();
    for field_messages in errors.values() {
        for message in field_messages.as_array()? {
            messages.push(message.as_str()?);
        }
    }

    Some(ApiError::new(status, messages.join("\n"), Reason::Generic, ""))
}

fn exception(json: &Map<String, Value>, status: u16) -> Option<ApiError> {
    let message = json.get("error").and_then(Value::as_str)?;
    let response = json
        .get("responseObject")
        .and_then(Value::as_str)
        .unwrap_or_default();

    tracing::debug!(status, error = message, "Backend reported an exception");

    Some(ApiError::new(
        i32::from(status),
        message,
        Reason::Generic,
        response,
    ))
}

fn failure(json: &Map<String, Value>) -> Option<ApiError> {
    let succeeded = json.get("succeeded").and_then(Value::as_bool)?;
    let message = json.get("message").and_then(Value::as_str)?;

    if succeeded {
        return None;
    }

    Some(ApiError::new(
        REQUEST_TIMED_OUT_CODE,
        message,
        Reason::RequestTimeout,
        "",
    ))
}
