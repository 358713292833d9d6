//! `data:` URL codec for uploaded and generated images.
//!
//! Clients send images as `data:<mime>;base64,<payload>` strings and receive
//! results in the same form. Only base64-encoded data URLs are accepted.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::CoreError;

/// MIME type assumed when a data URL omits one (`data:;base64,...`).
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// A decoded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parse and decode a `data:<mime>;base64,<payload>` string.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let rest = input
            .trim()
            .strip_prefix(SCHEME)
            .ok_or_else(|| CoreError::Validation("Image must be a data URL".into()))?;

        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::Validation("Image data URL has no payload".into()))?;

        let mime_type = meta.strip_suffix(BASE64_MARKER).ok_or_else(|| {
            CoreError::Validation("Image data URL must be base64-encoded".into())
        })?;
        let mime_type = if mime_type.is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            mime_type
        };

        if payload.is_empty() {
            return Err(CoreError::Validation("Image data URL payload is empty".into()));
        }

        let bytes = BASE64
            .decode(payload.as_bytes())
            .map_err(|e| CoreError::Validation(format!("Image payload is not valid base64: {e}")))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    /// Render back to a `data:` URL string.
    pub fn to_data_url(&self) -> String {
        encode(&self.mime_type, &self.bytes)
    }
}

/// Build a `data:<mime>;base64,<payload>` string from raw bytes.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("{SCHEME}{mime_type}{BASE64_MARKER},{}", BASE64.encode(bytes))
}
