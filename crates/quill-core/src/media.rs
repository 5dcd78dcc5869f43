//! Parsing of `data:` URIs carried by upload requests.
//!
//! Clients embed images as `data:<mime>;base64,<payload>` strings, the
//! same shape the platform historically stored inline.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::DomainError;

/// A decoded upload: mime type plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    /// Parse a `data:<mime>;base64,<payload>` string.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let rest = input
            .strip_prefix("data:")
            .ok_or_else(|| DomainError::Validation("Expected a data: URI".to_string()))?;

        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| DomainError::Validation("Expected base64-encoded data".to_string()))?;

        if mime.is_empty() || !mime.contains('/') {
            return Err(DomainError::Validation(format!(
                "Invalid media type: {mime:?}"
            )));
        }

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| DomainError::Validation(format!("Invalid base64 payload: {e}")))?;

        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_png_data_uri() {
        let uri = DataUri::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(uri.mime, "image/png");
        assert_eq!(uri.bytes, b"hello");
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(DataUri::parse("image/png;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn rejects_non_base64_encoding() {
        assert!(DataUri::parse("data:image/png;charset=utf8,hello").is_err());
    }

    #[test]
    fn rejects_invalid_payload() {
        assert!(DataUri::parse("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn rejects_blank_media_type() {
        assert!(DataUri::parse("data:;base64,aGVsbG8=").is_err());
    }
}
