//! Multipart body assembly.
//!
//! A multipart upload carries one primary binary part, described by the
//! descriptor's `withName`, `fileName` and `mimeType` parameters, plus one
//! JSON-encoded part per entry in `form_data_parameters`.

use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;
use crate::clients::http_request::{Parameters, RequestDescriptor};

/// Parameter naming the primary part's form field.
pub const WITH_NAME_KEY: &str = "withName";
/// Parameter naming the primary part's file.
pub const FILE_NAME_KEY: &str = "fileName";
/// Parameter naming the primary part's MIME type.
pub const MIME_TYPE_KEY: &str = "mimeType";

/// One part of a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub enum MultipartPart {
    /// An auxiliary field whose value is JSON-encoded.
    Field {
        /// Form field name.
        name: String,
        /// JSON bytes.
        data: Vec<u8>,
    },
    /// The primary binary part.
    File {
        /// Form field name.
        name: String,
        /// File name reported to the server.
        file_name: String,
        /// MIME type of `data`.
        mime_type: String,
        /// Raw payload.
        data: Vec<u8>,
    },
}

impl MultipartPart {
    /// Returns the part's form field name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Returns the part's payload.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        match self {
            Self::Field { data, .. } | Self::File { data, .. } => data,
        }
    }
}

impl fmt::Debug for MultipartPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { name, data } => f
                .debug_struct("Field")
                .field("name", name)
                .field("data", &String::from_utf8_lossy(data))
                .finish(),
            Self::File {
                name,
                file_name,
                mime_type,
                data,
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("mime_type", mime_type)
                .field("len", &data.len())
                .finish(),
        }
    }
}

/// Builds the parts for a multipart upload.
///
/// Auxiliary fields come first, in key order, followed by the primary part.
/// Each auxiliary value is JSON-encoded, so the string `"hi"` is sent as the
/// four bytes `"hi"` including quotes.
///
/// # Errors
///
/// - [`InvalidHttpRequestError::MissingBinaryPayload`] if the descriptor has no `form_data`
/// - [`InvalidHttpRequestError::MissingMultipartField`] if `withName`, `fileName`
///   or `mimeType` is missing or not a string
/// - [`InvalidHttpRequestError::Encoding`] if an auxiliary value cannot be encoded
pub fn build_parts(
    descriptor: &RequestDescriptor,
) -> Result<Vec<MultipartPart>, InvalidHttpRequestError> {
    let data = descriptor
        .form_data()
        .ok_or(InvalidHttpRequestError::MissingBinaryPayload)?;

    let parameters = descriptor.parameters();
    let name = required_string(parameters, WITH_NAME_KEY)?;
    let file_name = required_string(parameters, FILE_NAME_KEY)?;
    let mime_type = required_string(parameters, MIME_TYPE_KEY)?;

    let mut parts = Vec::new();

    if let Some(fields) = descriptor.form_data_parameters() {
        let mut keys: Vec<&String> = fields.keys().collect();
        keys.sort();
        for key in keys {
            let Some(value) = fields.get(key) else {
                continue;
            };
            let encoded =
                serde_json::to_vec(value).map_err(|e| InvalidHttpRequestError::Encoding {
                    reason: format!("form field '{key}': {e}"),
                })?;
            parts.push(MultipartPart::Field {
                name: key.clone(),
                data: encoded,
            });
        }
    }

    parts.push(MultipartPart::File {
        name,
        file_name,
        mime_type,
        data: data.to_vec(),
    });

    Ok(parts)
}

fn required_string(
    parameters: &Parameters,
    field: &'static str,
) -> Result<String, InvalidHttpRequestError> {
    parameters
        .get(field)
        .and_then(|value| value.as_str())
        .map(String::from)
        .ok_or(InvalidHttpRequestError::MissingMultipartField { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::http_request::HttpMethod;
    use serde_json::json;

    fn avatar_upload() -> crate::clients::RequestDescriptorBuilder {
        RequestDescriptor::builder(HttpMethod::Post, "https://a.test/avatar")
            .parameter(WITH_NAME_KEY, "avatar")
            .parameter(FILE_NAME_KEY, "a.png")
            .parameter(MIME_TYPE_KEY, "image/png")
            .form_data(vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_builds_primary_and_json_parts() {
        let descriptor = avatar_upload().form_data_parameter("caption", "hi").build();

        let parts = build_parts(&descriptor).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0],
            MultipartPart::Field {
                name: "caption".to_string(),
                data: br#""hi""#.to_vec(),
            }
        );
        assert_eq!(
            parts[1],
            MultipartPart::File {
                name: "avatar".to_string(),
                file_name: "a.png".to_string(),
                mime_type: "image/png".to_string(),
                data: vec![0x89, b'P', b'N', b'G'],
            }
        );
    }

    #[test]
    fn test_structured_fields_are_json_encoded() {
        let descriptor = avatar_upload()
            .form_data_parameter("tags", json!(["dog", "park"]))
            .form_data_parameter("meta", json!({"w": 10}))
            .build();

        let parts = build_parts(&descriptor).unwrap();
        let names: Vec<&str> = parts.iter().map(MultipartPart::name).collect();

        assert_eq!(names, vec!["meta", "tags", "avatar"]);
        assert_eq!(parts[0].data(), br#"{"w":10}"#);
        assert_eq!(parts[1].data(), br#"["dog","park"]"#);
    }

    #[test]
    fn test_only_primary_part_without_extra_fields() {
        let parts = build_parts(&avatar_upload().build()).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name(), "avatar");
    }

    #[test]
    fn test_missing_payload_is_rejected() {
        let descriptor = RequestDescriptor::builder(HttpMethod::Post, "https://a.test/avatar")
            .parameter(WITH_NAME_KEY, "avatar")
            .build();

        assert_eq!(
            build_parts(&descriptor),
            Err(InvalidHttpRequestError::MissingBinaryPayload)
        );
    }

    #[test]
    fn test_missing_part_description_is_rejected() {
        let descriptor = RequestDescriptor::builder(HttpMethod::Post, "https://a.test/avatar")
            .parameter(WITH_NAME_KEY, "avatar")
            .parameter(FILE_NAME_KEY, "a.png")
            .parameter(MIME_TYPE_KEY, 42)
            .form_data(vec![1, 2, 3])
            .build();

        assert_eq!(
            build_parts(&descriptor),
            Err(InvalidHttpRequestError::MissingMultipartField { field: "mimeType" })
        );
    }
}
