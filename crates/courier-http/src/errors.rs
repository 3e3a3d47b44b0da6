//! Error types for each boundary of the dispatcher.

use crate::payload::Payload;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("request target must not be empty")]
    EmptyTarget,
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("dispatch requires a running tokio runtime")]
    NoRuntime,
    #[error("dispatch task failed: {0}")]
    Join(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Cancelled,
    Body,
    Other,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Body => "body",
            Self::Other => "other",
        }
    }
}

/// No usable response was obtained; may still carry bytes read before the failure.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{} error: {message}", .kind.as_str())]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub partial_payload: Option<Payload>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            partial_payload: None,
        }
    }

    pub fn with_partial_payload(mut self, payload: Option<Payload>) -> Self {
        self.partial_payload = payload;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload json decode failed: {0}")]
    Json(String),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("slot already holds an active instance")]
    Occupied,
}
