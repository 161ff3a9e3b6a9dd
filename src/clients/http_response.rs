//! Raw HTTP response type.
//!
//! This module provides [`TransportResponse`], what a
//! [`Transport`](crate::clients::Transport) hands back before any validation
//! or decoding.

use std::collections::HashMap;

/// A response received by a transport.
///
/// Header names are stored lowercase; a header may carry multiple values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a new response, lowercasing header names.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, Vec<String>>, body: Vec<u8>) -> Self {
        let mut normalized: HashMap<String, Vec<String>> = HashMap::new();
        for (name, values) in headers {
            normalized
                .entry(name.to_lowercase())
                .or_default()
                .extend(values);
        }

        Self {
            status,
            headers: normalized,
            body,
        }
    }

    /// Returns the first value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the body, or `None` if it is empty.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        (!self.body.is_empty()).then_some(self.body.as_slice())
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns the request ID from the `X-Request-Id` header, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("X-Request-Id".to_string(), vec!["req-1".to_string()]);

        let response = TransportResponse::new(200, headers, Vec::new());

        assert_eq!(response.header("x-request-id"), Some("req-1"));
        assert_eq!(response.header("X-REQUEST-ID"), Some("req-1"));
        assert_eq!(response.request_id(), Some("req-1"));
    }

    #[test]
    fn test_empty_body_is_none() {
        let response = TransportResponse::new(204, HashMap::new(), Vec::new());
        assert!(response.body().is_none());

        let response = TransportResponse::new(200, HashMap::new(), b"{}".to_vec());
        assert_eq!(response.body(), Some(&b"{}"[..]));
        assert_eq!(response.body_text(), "{}");
    }
}
