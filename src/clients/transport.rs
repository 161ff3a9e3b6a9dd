//! The transport capability consumed by the executor.
//!
//! The executor never talks to the network directly. It builds a
//! [`TransportRequest`] and hands it to a [`Transport`], which performs the
//! HTTP exchange. [`ReqwestTransport`](crate::clients::ReqwestTransport) is
//! the production implementation; tests plug in their own.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Url;

use crate::clients::errors::TransportError;
use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::TransportResponse;
use crate::clients::multipart::MultipartPart;

/// The body of an outbound request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Raw bytes; the content type is carried in the headers.
    Bytes(Vec<u8>),
    /// A multipart body, streamed by the transport.
    Multipart(Vec<MultipartPart>),
}

/// A fully resolved wire request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The absolute URL, including any encoded query.
    pub url: Url,
    /// Headers to send.
    pub headers: HashMap<String, String>,
    /// The request body.
    pub body: RequestBody,
}

impl TransportRequest {
    /// Returns a header value, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Performs HTTP exchanges.
///
/// Implementations must be safe to call concurrently. Cancellation, if
/// needed, is the transport's concern.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no usable response was received.
    /// Timeouts must be reported with
    /// [`TransportErrorKind::TimedOut`](crate::clients::TransportErrorKind::TimedOut).
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let request = TransportRequest {
            method: HttpMethod::Post,
            url: Url::parse("https://api.example.com/dogs").unwrap(),
            headers,
            body: RequestBody::Empty,
        };

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert!(request.header("accept").is_none());
    }

    #[test]
    fn test_transport_is_object_safe() {
        fn takes_dyn(_: Option<&dyn Transport>) {}
        takes_dyn(None);
    }
}
