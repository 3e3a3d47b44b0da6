use std::fmt;

use crate::errors::{TransportError, TransportErrorKind};
use crate::payload::Payload;
use crate::policy::SuccessPolicy;

/// A response the transport obtained, before success classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub payload: Option<Payload>,
}

impl RawResponse {
    pub fn new(status: u16, payload: Option<Payload>) -> Self {
        Self { status, payload }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// No response was obtained.
    Transport(TransportErrorKind),
    /// A response was obtained with a status outside the success policy.
    Status(u16),
    /// Success status without a body.
    EmptySuccess(u16),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(kind) => write!(f, "transport:{}", kind.as_str()),
            Self::Status(status) => write!(f, "status:{status}"),
            Self::EmptySuccess(status) => write!(f, "empty_success:{status}"),
        }
    }
}

/// Error context handed to the custom handler and then the default handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    target: String,
    kind: FailureKind,
    payload: Option<Payload>,
    message: String,
}

impl Failure {
    pub fn new(
        target: impl Into<String>,
        kind: FailureKind,
        payload: Option<Payload>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            kind,
            payload,
            message: message.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Response status, if a response was obtained at all.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::Transport(_) => None,
            FailureKind::Status(status) | FailureKind::EmptySuccess(status) => Some(status),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success(Payload),
    Failure(Failure),
}

impl Outcome {
    pub fn classify(
        target: &str,
        result: Result<RawResponse, TransportError>,
        policy: &SuccessPolicy,
    ) -> Self {
        let response = match result {
            Ok(response) => response,
            Err(error) => {
                let message = error.to_string();
                return Self::Failure(Failure::new(
                    target,
                    FailureKind::Transport(error.kind),
                    error.partial_payload,
                    message,
                ));
            }
        };

        if !policy.accepts(response.status) {
            return Self::Failure(Failure::new(
                target,
                FailureKind::Status(response.status),
                response.payload,
                format!(
                    "status {} not accepted by success policy {policy}",
                    response.status
                ),
            ));
        }

        match response.payload {
            Some(payload) => Self::Success(payload),
            None => Self::Failure(Failure::new(
                target,
                FailureKind::EmptySuccess(response.status),
                None,
                format!("status {} returned no payload", response.status),
            )),
        }
    }
}
