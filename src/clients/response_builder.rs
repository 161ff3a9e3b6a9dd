//! Response decoding capability.
//!
//! The executor validates a response and parses its JSON, then hands the
//! value to a [`ResponseBuilder`] chosen by the caller for each call.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Error returned when a JSON value cannot be turned into the caller's type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl From<serde_json::Error> for DecodeError {
    fn from(error: serde_json::Error) -> Self {
        Self(error.to_string())
    }
}

/// Turns a validated JSON payload into a response value.
///
/// An empty response body is presented as [`Value::Null`].
pub trait ResponseBuilder: Send + Sync {
    /// The decoded response type.
    type Output;

    /// Builds the response from `value`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if `value` does not describe an `Output`.
    fn build(&self, value: Value) -> Result<Self::Output, DecodeError>;
}

/// Decodes responses with `serde`.
///
/// # Example
///
/// ```rust
/// use lyst_network::{Json, ResponseBuilder};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Dog {
///     name: String,
/// }
///
/// let dog = Json::<Dog>::new().build(serde_json::json!({"name": "Rex"})).unwrap();
/// assert_eq!(dog.name, "Rex");
/// ```
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    /// Creates a new decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Json<T> {}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Json<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> ResponseBuilder for Json<T> {
    type Output = T;

    fn build(&self, value: Value) -> Result<T, DecodeError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Returns the JSON payload untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawJson;

impl ResponseBuilder for RawJson {
    type Output = Value;

    fn build(&self, value: Value) -> Result<Value, DecodeError> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Dog {
        name: String,
        age: u8,
    }

    #[test]
    fn test_json_decodes_typed_response() {
        let dog = Json::<Dog>::new()
            .build(json!({"name": "Rex", "age": 3}))
            .unwrap();
        assert_eq!(
            dog,
            Dog {
                name: "Rex".to_string(),
                age: 3
            }
        );
    }

    #[test]
    fn test_json_reports_shape_mismatch() {
        let error = Json::<Dog>::new().build(json!({"name": "Rex"})).unwrap_err();
        assert!(error.to_string().contains("age"));
    }

    #[test]
    fn test_raw_json_passes_value_through() {
        let value = json!([1, 2, 3]);
        assert_eq!(RawJson.build(value.clone()).unwrap(), value);
    }

    #[test]
    fn test_json_builder_is_send_sync_for_any_target() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Json<std::rc::Rc<String>>>();
    }
}
