use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::errors::PayloadError;

/// Non-empty response body plus its declared content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    bytes: Bytes,
    content_type: Option<String>,
}

impl Payload {
    /// Returns `None` for an empty body; a payload always carries bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return None;
        }
        Some(Self {
            bytes,
            content_type: None,
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        serde_json::from_slice(&self.bytes).map_err(|err| PayloadError::Json(err.to_string()))
    }

    /// Lossy UTF-8 prefix of at most `max_bytes`, for log lines.
    pub fn preview(&self, max_bytes: usize) -> String {
        let end = self.bytes.len().min(max_bytes);
        let mut preview = String::from_utf8_lossy(&self.bytes[..end]).into_owned();
        if end < self.bytes.len() {
            preview.push_str("...");
        }
        preview
    }
}
