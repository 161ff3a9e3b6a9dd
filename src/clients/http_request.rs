//! Request descriptor types.
//!
//! This module provides the [`RequestDescriptor`] type and its builder, the
//! declarative description of one outbound call.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::clients::encoding::ParameterEncoding;
use crate::config::ApiKey;

/// A JSON object of request parameters.
pub type Parameters = Map<String, Value>;

/// HTTP methods supported by the executor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    #[default]
    Get,
    /// HTTP HEAD method.
    Head,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP PATCH method.
    Patch,
    /// HTTP DELETE method.
    Delete,
    /// HTTP OPTIONS method.
    Options,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }

    /// Returns `true` for methods that only read (`GET` and `HEAD`).
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable description of one outbound call.
///
/// Use [`RequestDescriptor::builder`] to construct descriptors. Fields not
/// set on the builder take these defaults:
///
/// | Field | Default |
/// |---|---|
/// | `parameters` | empty |
/// | `array_parameters` | absent |
/// | `form_data` | absent |
/// | `form_data_parameters` | absent |
/// | `headers` | empty |
/// | `is_form_url_encoded` | `false` |
/// | `custom_encoding` | absent |
/// | `x_api_key` | absent |
///
/// The body is driven by at most one source: `form_data` (multipart) wins
/// over `array_parameters`, which wins over `parameters`.
///
/// # Example
///
/// ```rust
/// use lyst_network::{HttpMethod, RequestDescriptor};
///
/// let sign_in = RequestDescriptor::builder(HttpMethod::Post, "https://api.example.com/sign-in")
///     .parameter("email", "jane@example.com")
///     .parameter("password", "hunter2")
///     .header("Content-Type", "application/x-www-form-urlencoded")
///     .form_url_encoded(true)
///     .build();
///
/// assert!(sign_in.is_form_url_encoded());
/// assert_eq!(sign_in.headers().len(), 1);
/// ```
#[derive(Clone)]
pub struct RequestDescriptor {
    endpoint: String,
    method: HttpMethod,
    parameters: Parameters,
    array_parameters: Option<Vec<Parameters>>,
    form_data: Option<Vec<u8>>,
    form_data_parameters: Option<Parameters>,
    headers: HashMap<String, String>,
    is_form_url_encoded: bool,
    custom_encoding: Option<ParameterEncoding>,
    x_api_key: Option<ApiKey>,
}

impl RequestDescriptor {
    /// Creates a new builder for the given method and endpoint URL.
    #[must_use]
    pub fn builder(method: HttpMethod, endpoint: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new(method, endpoint)
    }

    /// Returns the endpoint URL string.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the scalar parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the top-level array payload, if any.
    #[must_use]
    pub fn array_parameters(&self) -> Option<&[Parameters]> {
        self.array_parameters.as_deref()
    }

    /// Returns the raw binary payload for multipart uploads, if any.
    #[must_use]
    pub fn form_data(&self) -> Option<&[u8]> {
        self.form_data.as_deref()
    }

    /// Returns the extra multipart fields, if any.
    #[must_use]
    pub const fn form_data_parameters(&self) -> Option<&Parameters> {
        self.form_data_parameters.as_ref()
    }

    /// Returns the header overrides.
    ///
    /// A non-empty map replaces the synthesized authorization headers.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns `true` if the call must be form-url-encoded regardless of method.
    #[must_use]
    pub const fn is_form_url_encoded(&self) -> bool {
        self.is_form_url_encoded
    }

    /// Returns the explicit encoding override, if any.
    #[must_use]
    pub const fn custom_encoding(&self) -> Option<&ParameterEncoding> {
        self.custom_encoding.as_ref()
    }

    /// Returns the API key carried by non-standard call sites, if any.
    ///
    /// This value is informational; authorization headers always come from
    /// the credential store or from [`headers`](Self::headers).
    #[must_use]
    pub const fn x_api_key(&self) -> Option<&ApiKey> {
        self.x_api_key.as_ref()
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("parameters", &self.parameters)
            .field("array_parameters", &self.array_parameters)
            .field("form_data_len", &self.form_data.as_ref().map(Vec::len))
            .field("form_data_parameters", &self.form_data_parameters)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("is_form_url_encoded", &self.is_form_url_encoded)
            .field("custom_encoding", &self.custom_encoding)
            .field("x_api_key", &self.x_api_key)
            .finish()
    }
}

/// Builder for constructing [`RequestDescriptor`] instances.
#[derive(Debug)]
pub struct RequestDescriptorBuilder {
    descriptor: RequestDescriptor,
}

impl RequestDescriptorBuilder {
    fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            descriptor: RequestDescriptor {
                endpoint: endpoint.into(),
                method,
                parameters: Parameters::new(),
                array_parameters: None,
                form_data: None,
                form_data_parameters: None,
                headers: HashMap::new(),
                is_form_url_encoded: false,
                custom_encoding: None,
                x_api_key: None,
            },
        }
    }

    /// Sets all parameters at once.
    #[must_use]
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.descriptor.parameters = parameters;
        self
    }

    /// Adds a single parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.descriptor.parameters.insert(key.into(), value.into());
        self
    }

    /// Sets a top-level array payload.
    ///
    /// Use this for APIs whose body must be a JSON array rather than an object.
    #[must_use]
    pub fn array_parameters(mut self, items: Vec<Parameters>) -> Self {
        self.descriptor.array_parameters = Some(items);
        self
    }

    /// Sets the binary payload, turning the call into a multipart upload.
    ///
    /// The part's field name, file name and MIME type are read from the
    /// `withName`, `fileName` and `mimeType` parameters.
    #[must_use]
    pub fn form_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.descriptor.form_data = Some(data.into());
        self
    }

    /// Sets all extra multipart fields at once.
    #[must_use]
    pub fn form_data_parameters(mut self, parameters: Parameters) -> Self {
        self.descriptor.form_data_parameters = Some(parameters);
        self
    }

    /// Adds a single extra multipart field. The value is sent JSON-encoded.
    #[must_use]
    pub fn form_data_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.descriptor
            .form_data_parameters
            .get_or_insert_with(Parameters::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets all header overrides at once.
    #[must_use]
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.descriptor.headers = headers;
        self
    }

    /// Adds a single header override.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.headers.insert(key.into(), value.into());
        self
    }

    /// Requests `application/x-www-form-urlencoded` encoding regardless of method.
    #[must_use]
    pub const fn form_url_encoded(mut self, enabled: bool) -> Self {
        self.descriptor.is_form_url_encoded = enabled;
        self
    }

    /// Sets an explicit encoding, overriding method-based selection.
    #[must_use]
    pub fn custom_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.descriptor.custom_encoding = Some(encoding);
        self
    }

    /// Sets the API key carried by non-standard call sites.
    #[must_use]
    pub fn x_api_key(mut self, key: ApiKey) -> Self {
        self.descriptor.x_api_key = Some(key);
        self
    }

    /// Builds the [`RequestDescriptor`].
    #[must_use]
    pub fn build(self) -> RequestDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_only_get_and_head_are_read_only() {
        assert!(HttpMethod::Get.is_read_only());
        assert!(HttpMethod::Head.is_read_only());
        for method in [
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Options,
        ] {
            assert!(!method.is_read_only(), "{method} should not be read-only");
        }
    }

    #[test]
    fn test_builder_defaults() {
        let descriptor =
            RequestDescriptor::builder(HttpMethod::default(), "https://a.test/x").build();

        assert_eq!(descriptor.method(), HttpMethod::Get);
        assert!(descriptor.parameters().is_empty());
        assert!(descriptor.array_parameters().is_none());
        assert!(descriptor.form_data().is_none());
        assert!(descriptor.form_data_parameters().is_none());
        assert!(descriptor.headers().is_empty());
        assert!(!descriptor.is_form_url_encoded());
        assert!(descriptor.custom_encoding().is_none());
        assert!(descriptor.x_api_key().is_none());
    }

    #[test]
    fn test_builder_collects_parameters_and_headers() {
        let descriptor = RequestDescriptor::builder(HttpMethod::Post, "https://a.test/dogs")
            .parameter("name", "Rex")
            .parameter("age", 3)
            .header("X-Trace", "abc")
            .form_data_parameter("caption", "hi")
            .build();

        assert_eq!(descriptor.parameters().get("name"), Some(&json!("Rex")));
        assert_eq!(descriptor.parameters().get("age"), Some(&json!(3)));
        assert_eq!(descriptor.headers().get("X-Trace"), Some(&"abc".to_string()));
        assert_eq!(
            descriptor.form_data_parameters().and_then(|p| p.get("caption")),
            Some(&json!("hi"))
        );
    }

    #[test]
    fn test_debug_masks_api_key_and_payload() {
        let descriptor = RequestDescriptor::builder(HttpMethod::Post, "https://a.test/upload")
            .form_data(vec![0xde, 0xad, 0xbe, 0xef])
            .x_api_key(ApiKey::new("very-secret").unwrap())
            .header("x-api-key", "also-secret")
            .build();

        let debug = format!("{descriptor:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("also-secret"));
        assert!(debug.contains("form_data_len: Some(4)"));
    }
}
