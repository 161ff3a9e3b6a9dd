//! Parameter encoding strategies.
//!
//! An encoding decides where a descriptor's parameters go (URL query or
//! body) and how they are serialized. [`select_encoding`] picks one per call
//! from the HTTP method, the form-url flag and an explicit override.
//!
//! # Query encoding
//!
//! Parameters are flattened with bracket notation and percent-encoded, with
//! keys sorted:
//!
//! - nested objects: `user[name]=Jane`
//! - arrays: `tags[]=a&tags[]=b`
//! - booleans: `1` / `0`
//! - `null`: empty value
//!
//! For `GET`, `HEAD` and `DELETE` the string is appended to the URL query.
//! For every other method it becomes the request body with
//! `Content-Type: application/x-www-form-urlencoded; charset=utf-8`, which is
//! how form-encoded sign-in endpoints are reached.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::clients::errors::InvalidHttpRequestError;
use crate::clients::http_request::{HttpMethod, Parameters};

/// Content type for JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type for form-url-encoded bodies.
pub const FORM_URL_ENCODED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// The serialized form of a descriptor's parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedParameters {
    /// Percent-encoded query string to append to the URL, without the leading `?`.
    pub query: Option<String>,
    /// Request body bytes.
    pub body: Option<Vec<u8>>,
    /// `Content-Type` for the body, applied unless the caller set one.
    pub content_type: Option<String>,
}

/// A caller-supplied parameter serializer.
///
/// # Example
///
/// ```rust
/// use lyst_network::clients::{EncodedParameters, ParameterEncoder};
/// use lyst_network::{HttpMethod, InvalidHttpRequestError};
/// use serde_json::{Map, Value};
///
/// /// Sends parameters as a plain-text `key:value` list.
/// #[derive(Debug)]
/// struct PlainText;
///
/// impl ParameterEncoder for PlainText {
///     fn encode(
///         &self,
///         _method: HttpMethod,
///         parameters: &Map<String, Value>,
///     ) -> Result<EncodedParameters, InvalidHttpRequestError> {
///         let body: Vec<String> = parameters.iter().map(|(k, v)| format!("{k}:{v}")).collect();
///         Ok(EncodedParameters {
///             query: None,
///             body: Some(body.join("\n").into_bytes()),
///             content_type: Some("text/plain".to_string()),
///         })
///     }
/// }
/// ```
pub trait ParameterEncoder: Send + Sync + fmt::Debug {
    /// Serializes `parameters` for a request using `method`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::Encoding`] if the parameters cannot
    /// be represented.
    fn encode(
        &self,
        method: HttpMethod,
        parameters: &Parameters,
    ) -> Result<EncodedParameters, InvalidHttpRequestError>;
}

/// How a descriptor's parameters are serialized.
#[derive(Clone, Debug)]
pub enum ParameterEncoding {
    /// URL query string, or form-url-encoded body for non-URL methods.
    Query,
    /// JSON object body.
    Json,
    /// Caller-supplied encoder.
    Custom(Arc<dyn ParameterEncoder>),
}

impl ParameterEncoding {
    /// Wraps a caller-supplied encoder.
    #[must_use]
    pub fn custom(encoder: impl ParameterEncoder + 'static) -> Self {
        Self::Custom(Arc::new(encoder))
    }

    /// Returns `true` for [`ParameterEncoding::Query`].
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query)
    }

    /// Returns `true` for [`ParameterEncoding::Json`].
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    /// Serializes `parameters` for a request using `method`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::Encoding`] if serialization fails.
    pub fn encode(
        &self,
        method: HttpMethod,
        parameters: &Parameters,
    ) -> Result<EncodedParameters, InvalidHttpRequestError> {
        match self {
            Self::Query => Ok(encode_query(method, parameters)),
            Self::Json => {
                let body = serde_json::to_vec(parameters).map_err(|e| {
                    InvalidHttpRequestError::Encoding {
                        reason: e.to_string(),
                    }
                })?;
                Ok(EncodedParameters {
                    query: None,
                    body: Some(body),
                    content_type: Some(JSON_CONTENT_TYPE.to_string()),
                })
            }
            Self::Custom(encoder) => encoder.encode(method, parameters),
        }
    }
}

/// Chooses the encoding for a call.
///
/// In priority order:
/// 1. an explicit `override_encoding` is used verbatim;
/// 2. `form_url_encoded` treats the call like a read and picks [`ParameterEncoding::Query`];
/// 3. `GET`/`HEAD` pick [`ParameterEncoding::Query`], everything else [`ParameterEncoding::Json`].
#[must_use]
pub fn select_encoding(
    method: HttpMethod,
    form_url_encoded: bool,
    override_encoding: Option<&ParameterEncoding>,
) -> ParameterEncoding {
    if let Some(encoding) = override_encoding {
        return encoding.clone();
    }

    let effective = if form_url_encoded {
        HttpMethod::Get
    } else {
        method
    };

    if effective.is_read_only() {
        ParameterEncoding::Query
    } else {
        ParameterEncoding::Json
    }
}

/// Builds the percent-encoded `a=1&b[]=2` string for `parameters`.
#[must_use]
pub fn query_string(parameters: &Parameters) -> String {
    let mut components = Vec::new();
    let mut keys: Vec<&String> = parameters.keys().collect();
    keys.sort();

    for key in keys {
        if let Some(value) = parameters.get(key) {
            push_components(key, value, &mut components);
        }
    }

    components
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_components(key: &str, value: &Value, components: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            let mut nested: Vec<&String> = map.keys().collect();
            nested.sort();
            for nested_key in nested {
                if let Some(nested_value) = map.get(nested_key) {
                    push_components(&format!("{key}[{nested_key}]"), nested_value, components);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                push_components(&format!("{key}[]"), item, components);
            }
        }
        Value::Bool(flag) => {
            let encoded = if *flag { "1" } else { "0" };
            components.push((escape(key), encoded.to_string()));
        }
        Value::Number(number) => components.push((escape(key), escape(&number.to_string()))),
        Value::String(text) => components.push((escape(key), escape(text))),
        Value::Null => components.push((escape(key), String::new())),
    }
}

fn escape(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

const fn encodes_in_url(method: HttpMethod) -> bool {
    matches!(method, HttpMethod::Get | HttpMethod::Head | HttpMethod::Delete)
}

fn encode_query(method: HttpMethod, parameters: &Parameters) -> EncodedParameters {
    let query = query_string(parameters);

    if encodes_in_url(method) {
        EncodedParameters {
            query: (!query.is_empty()).then_some(query),
            body: None,
            content_type: None,
        }
    } else {
        EncodedParameters {
            query: None,
            body: Some(query.into_bytes()),
            content_type: Some(FORM_URL_ENCODED_CONTENT_TYPE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[derive(Debug)]
    struct Upper;

    impl ParameterEncoder for Upper {
        fn encode(
            &self,
            _method: HttpMethod,
            parameters: &Parameters,
        ) -> Result<EncodedParameters, InvalidHttpRequestError> {
            Ok(EncodedParameters {
                query: None,
                body: Some(query_string(parameters).to_uppercase().into_bytes()),
                content_type: Some("text/plain".to_string()),
            })
        }
    }

    #[test]
    fn test_read_methods_select_query_encoding() {
        for method in [HttpMethod::Get, HttpMethod::Head] {
            assert!(select_encoding(method, false, None).is_query());
        }
    }

    #[test]
    fn test_other_methods_select_json_encoding() {
        for method in [
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Options,
        ] {
            assert!(select_encoding(method, false, None).is_json(), "{method}");
        }
    }

    #[test]
    fn test_form_flag_forces_query_encoding() {
        assert!(select_encoding(HttpMethod::Post, true, None).is_query());
        assert!(select_encoding(HttpMethod::Put, true, None).is_query());
    }

    #[test]
    fn test_override_always_wins() {
        let json = ParameterEncoding::Json;
        assert!(select_encoding(HttpMethod::Get, true, Some(&json)).is_json());

        let custom = ParameterEncoding::custom(Upper);
        assert!(matches!(
            select_encoding(HttpMethod::Post, false, Some(&custom)),
            ParameterEncoding::Custom(_)
        ));
    }

    #[test]
    fn test_query_string_flattens_nested_values() {
        let parameters = params(json!({
            "tags": ["a", "b"],
            "active": true,
            "user": {"name": "Jane Doe", "age": 30},
            "empty": null
        }));

        assert_eq!(
            query_string(&parameters),
            "active=1&empty=&tags%5B%5D=a&tags%5B%5D=b&user%5Bage%5D=30&user%5Bname%5D=Jane%20Doe"
        );
    }

    #[test]
    fn test_query_encoding_on_get_goes_into_url() {
        let parameters = params(json!({"page": 2, "q": "a&b"}));
        let encoded = ParameterEncoding::Query
            .encode(HttpMethod::Get, &parameters)
            .unwrap();

        assert_eq!(encoded.query.as_deref(), Some("page=2&q=a%26b"));
        assert!(encoded.body.is_none());
        assert!(encoded.content_type.is_none());
    }

    #[test]
    fn test_query_encoding_on_delete_goes_into_url() {
        let parameters = params(json!({"id": 7}));
        let encoded = ParameterEncoding::Query
            .encode(HttpMethod::Delete, &parameters)
            .unwrap();

        assert_eq!(encoded.query.as_deref(), Some("id=7"));
    }

    #[test]
    fn test_query_encoding_on_post_becomes_form_body() {
        let parameters = params(json!({"email": "jane@example.com", "password": "p w"}));
        let encoded = ParameterEncoding::Query
            .encode(HttpMethod::Post, &parameters)
            .unwrap();

        assert!(encoded.query.is_none());
        assert_eq!(
            encoded.body.as_deref(),
            Some("email=jane%40example.com&password=p%20w".as_bytes())
        );
        assert_eq!(
            encoded.content_type.as_deref(),
            Some(FORM_URL_ENCODED_CONTENT_TYPE)
        );
    }

    #[test]
    fn test_empty_query_on_get_adds_nothing() {
        let encoded = ParameterEncoding::Query
            .encode(HttpMethod::Get, &Parameters::new())
            .unwrap();

        assert_eq!(encoded, EncodedParameters::default());
    }

    #[test]
    fn test_json_encoding_serializes_object_body() {
        let parameters = params(json!({"name": "Rex"}));
        let encoded = ParameterEncoding::Json
            .encode(HttpMethod::Post, &parameters)
            .unwrap();

        let body: Value = serde_json::from_slice(encoded.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Rex"}));
        assert_eq!(encoded.content_type.as_deref(), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn test_custom_encoding_delegates_to_encoder() {
        let parameters = params(json!({"name": "rex"}));
        let encoded = ParameterEncoding::custom(Upper)
            .encode(HttpMethod::Put, &parameters)
            .unwrap();

        assert_eq!(encoded.body.as_deref(), Some("NAME=REX".as_bytes()));
        assert_eq!(encoded.content_type.as_deref(), Some("text/plain"));
    }
}
