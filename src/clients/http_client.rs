//! reqwest-backed transport.
//!
//! This module provides [`ReqwestTransport`], the production
//! [`Transport`] used by the executor.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::clients::errors::TransportError;
use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::TransportResponse;
use crate::clients::multipart::MultipartPart;
use crate::clients::transport::{RequestBody, Transport, TransportRequest};
use crate::config::NetworkConfig;
use crate::error::ConfigError;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP transport built on `reqwest`.
///
/// The transport adds a `User-Agent` header to every request and, when the
/// configuration sets one, enforces a timeout. Expired requests are reported
/// as timeouts so the executor maps them to
/// [`Reason::RequestTimeout`](crate::Reason::RequestTimeout).
///
/// # Thread Safety
///
/// `ReqwestTransport` is `Send + Sync` and cheap to clone; clones share the
/// underlying connection pool.
///
/// # Example
///
/// ```rust
/// use lyst_network::{NetworkConfig, Region, ReqwestTransport};
///
/// let config = NetworkConfig::builder()
///     .region(Region::new("uae").unwrap())
///     .user_agent_prefix("LystApp/2.1")
///     .build()
///     .unwrap();
///
/// let transport = ReqwestTransport::new(Some(&config)).unwrap();
/// let user_agent = transport.default_headers().get("User-Agent").unwrap();
/// assert!(user_agent.starts_with("LystApp/2.1 | "));
/// ```
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    default_headers: HashMap<String, String>,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport, applying the configured user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the TLS backend cannot be initialised.
    pub fn new(config: Option<&NetworkConfig>) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.and_then(NetworkConfig::timeout) {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| ConfigError::HttpClient {
            reason: e.to_string(),
        })?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a transport around an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: Option<&NetworkConfig>) -> Self {
        let user_agent_prefix = config
            .and_then(NetworkConfig::user_agent_prefix)
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Lyst Network Library v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);

        Self {
            client,
            default_headers,
        }
    }

    /// Returns the headers added to every request unless the request sets them.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    fn build_form(parts: Vec<MultipartPart>) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for part in parts {
            form = match part {
                MultipartPart::Field { name, data } => form.part(name, Part::bytes(data)),
                MultipartPart::File {
                    name,
                    file_name,
                    mime_type,
                    data,
                } => {
                    let part = Part::bytes(data)
                        .file_name(file_name)
                        .mime_str(&mime_type)
                        .map_err(|e| {
                            TransportError::other(format!("Invalid MIME type '{mime_type}': {e}"))
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn map_reqwest_error(error: &reqwest::Error) -> TransportError {
    let mapped = if error.is_timeout() {
        TransportError::timed_out(error.to_string())
    } else if error.is_connect() {
        TransportError::connection(error.to_string())
    } else {
        TransportError::other(error.to_string())
    };

    match error.status() {
        Some(status) => mapped.with_status(status.as_u16()),
        None => mapped,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let is_multipart = matches!(request.body, RequestBody::Multipart(_));
        let mut req_builder = self
            .client
            .request(to_reqwest_method(request.method), request.url);

        for (key, value) in &self.default_headers {
            if !request.headers.keys().any(|k| k.eq_ignore_ascii_case(key)) {
                req_builder = req_builder.header(key, value);
            }
        }

        for (key, value) in &request.headers {
            // The form owns the Content-Type so the boundary stays intact
            if is_multipart && key.eq_ignore_ascii_case("content-type") {
                continue;
            }
            req_builder = req_builder.header(key, value);
        }

        req_builder = match request.body {
            RequestBody::Empty => req_builder,
            RequestBody::Bytes(bytes) => req_builder.body(bytes),
            RequestBody::Multipart(parts) => req_builder.multipart(Self::build_form(parts)?),
        };

        let res = req_builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e))?;

        let status = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body = res
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(&e).with_status(status))?;

        Ok(TransportResponse::new(status, headers, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;
    use std::time::Duration;

    #[test]
    fn test_user_agent_header_format() {
        let transport = ReqwestTransport::new(None).unwrap();

        let user_agent = transport.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("Lyst Network Library v"));
        assert!(user_agent.contains("Rust"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = NetworkConfig::builder()
            .region(Region::new("uae").unwrap())
            .user_agent_prefix("LystApp/2.1")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let transport = ReqwestTransport::new(Some(&config)).unwrap();

        let user_agent = transport.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("LystApp/2.1 | "));
        assert!(user_agent.contains("Lyst Network Library"));
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(HttpMethod::Options), reqwest::Method::OPTIONS);
    }

    #[test]
    fn test_invalid_mime_type_is_a_transport_error() {
        let parts = vec![MultipartPart::File {
            name: "avatar".to_string(),
            file_name: "a.png".to_string(),
            mime_type: "not a mime".to_string(),
            data: vec![1],
        }];

        let error = ReqwestTransport::build_form(parts).unwrap_err();
        assert!(error.message.contains("not a mime"));
    }

    #[test]
    fn test_transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestTransport>();
    }
}
