//! Error continuations: the per-call custom handler and the process-wide default.

use std::sync::{Arc, OnceLock, RwLock};

use crate::outcome::Failure;
use crate::payload::Payload;
use crate::slot::ActiveSlot;

const PAYLOAD_PREVIEW_BYTES: usize = 256;

/// What a custom error handler reports back to the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handling {
    Handled,
    /// Fall through to the default handler.
    Declined,
}

impl From<bool> for Handling {
    fn from(handled: bool) -> Self {
        if handled { Self::Handled } else { Self::Declined }
    }
}

/// Which terminal path ran for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Succeeded,
    HandledByCaller,
    DeclinedToDefault,
    HandledByDefault,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::HandledByCaller => "handled_by_caller",
            Self::DeclinedToDefault => "declined_to_default",
            Self::HandledByDefault => "handled_by_default",
        }
    }

    pub fn reached_default(&self) -> bool {
        matches!(self, Self::DeclinedToDefault | Self::HandledByDefault)
    }
}

pub type SuccessFn = Box<dyn FnOnce(Payload) + Send + 'static>;
pub type ErrorFn = Box<dyn FnOnce(&Failure) -> Handling + Send + 'static>;

/// Terminal fallback for failures. Implementations must not panic.
pub trait DefaultErrorHandler: Send + Sync {
    fn handle(&self, failure: &Failure);
}

impl<F> DefaultErrorHandler for F
where
    F: Fn(&Failure) + Send + Sync,
{
    fn handle(&self, failure: &Failure) {
        self(failure)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingErrorHandler;

impl DefaultErrorHandler for LoggingErrorHandler {
    fn handle(&self, failure: &Failure) {
        log_failure(failure);
    }
}

fn log_failure(failure: &Failure) {
    let status = failure
        .status()
        .map(|status| status.to_string())
        .unwrap_or_else(|| "-".to_string());
    let payload_len = failure.payload().map(Payload::len).unwrap_or(0);
    let payload_preview = failure
        .payload()
        .map(|payload| payload.preview(PAYLOAD_PREVIEW_BYTES))
        .unwrap_or_default();
    tracing::warn!(
        request_target = failure.target(),
        kind = %failure.kind(),
        status = %status,
        payload_len,
        payload_preview = %payload_preview,
        "request failed: {}",
        failure.message()
    );
}

/// Transient single-instance message describing the latest unhandled failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub target: String,
    pub summary: String,
}

impl Notice {
    pub fn from_failure(failure: &Failure) -> Self {
        let summary = match failure.payload() {
            Some(payload) => format!(
                "{} ({}): {}",
                failure.kind(),
                failure.message(),
                payload.preview(PAYLOAD_PREVIEW_BYTES)
            ),
            None => format!("{} ({})", failure.kind(), failure.message()),
        };
        Self {
            target: failure.target().to_string(),
            summary,
        }
    }
}

/// Logs like [`LoggingErrorHandler`] and also posts a [`Notice`], replacing any visible one.
#[derive(Clone, Debug, Default)]
pub struct NoticeErrorHandler {
    slot: Arc<ActiveSlot<Notice>>,
}

impl NoticeErrorHandler {
    pub fn new(slot: Arc<ActiveSlot<Notice>>) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &Arc<ActiveSlot<Notice>> {
        &self.slot
    }
}

impl DefaultErrorHandler for NoticeErrorHandler {
    fn handle(&self, failure: &Failure) {
        log_failure(failure);
        if let Some(previous) = self.slot.replace(Notice::from_failure(failure)) {
            tracing::debug!(request_target = previous.target.as_str(), "replaced visible notice");
        }
    }
}

static DEFAULT_HANDLER: OnceLock<RwLock<Arc<dyn DefaultErrorHandler>>> = OnceLock::new();

fn default_slot() -> &'static RwLock<Arc<dyn DefaultErrorHandler>> {
    DEFAULT_HANDLER.get_or_init(|| RwLock::new(Arc::new(LoggingErrorHandler)))
}

/// Current process-wide default handler; [`LoggingErrorHandler`] until one is installed.
pub fn default_error_handler() -> Arc<dyn DefaultErrorHandler> {
    let guard = default_slot()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

pub fn set_default_error_handler(handler: Arc<dyn DefaultErrorHandler>) {
    let mut guard = default_slot()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = handler;
}

pub fn reset_default_error_handler() {
    set_default_error_handler(Arc::new(LoggingErrorHandler));
}

/// Runs the custom handler, then the default one unless the custom handler took it.
pub fn resolve_failure(
    failure: &Failure,
    on_error: Option<ErrorFn>,
    default: &dyn DefaultErrorHandler,
) -> Resolution {
    match on_error {
        Some(on_error) => match on_error(failure) {
            Handling::Handled => Resolution::HandledByCaller,
            Handling::Declined => {
                default.handle(failure);
                Resolution::DeclinedToDefault
            }
        },
        None => {
            default.handle(failure);
            Resolution::HandledByDefault
        }
    }
}
