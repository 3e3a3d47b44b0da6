#![doc = r#"
Request dispatch with delegated, chainable error handling.

Outcome routing:

| Transport result | Classified as | Continuation path |
| --- | --- | --- |
| response, status accepted, body present | `Outcome::Success` | `on_success(payload)` |
| response, status accepted, body empty | `FailureKind::EmptySuccess` | error resolution, no payload |
| response, status rejected | `FailureKind::Status` | error resolution with the body |
| no response (connect, timeout, cancel, body) | `FailureKind::Transport` | error resolution with any partial body |

Error resolution:
- With `on_error`, it runs first. `Handling::Handled` stops there; `Handling::Declined` falls through to the default handler.
- Without `on_error`, the default handler runs directly.
- The default handler is the dispatcher override if set, otherwise the process-wide one (`default_error_handler()`).

Exactly one terminal path runs per request. There are no retries.
"#]

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod handler;
pub mod outcome;
pub mod payload;
pub mod policy;
pub mod request;
pub mod slot;
pub mod testing;
pub mod transport;

pub use config::DispatcherConfig;
pub use dispatcher::{Continuations, DispatchHandle, Dispatcher};
pub use errors::{
    ConfigError, DispatchError, PayloadError, SlotError, TransportError, TransportErrorKind,
};
pub use handler::{
    DefaultErrorHandler, ErrorFn, Handling, LoggingErrorHandler, Notice, NoticeErrorHandler,
    Resolution, SuccessFn, default_error_handler, reset_default_error_handler, resolve_failure,
    set_default_error_handler,
};
pub use outcome::{Failure, FailureKind, Outcome, RawResponse};
pub use payload::Payload;
pub use policy::SuccessPolicy;
pub use request::{Method, RequestDescriptor, parse_header};
pub use slot::{ActiveSlot, SlotGuard};
pub use testing::StubTransport;
pub use transport::{ReqwestTransport, Transport};
