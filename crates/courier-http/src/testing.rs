use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::errors::{TransportError, TransportErrorKind};
use crate::outcome::RawResponse;
use crate::payload::Payload;
use crate::request::RequestDescriptor;
use crate::transport::Transport;

/// Scripted in-memory transport. Unscripted targets behave like a refused connection.
#[derive(Clone, Debug, Default)]
pub struct StubTransport {
    inner: Arc<Mutex<StubState>>,
}

#[derive(Debug, Default)]
struct StubState {
    scripts: BTreeMap<String, VecDeque<Result<RawResponse, TransportError>>>,
    issued: Vec<RequestDescriptor>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, target: &str, result: Result<RawResponse, TransportError>) {
        self.state()
            .scripts
            .entry(target.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn push_response(&self, target: &str, response: RawResponse) {
        self.push(target, Ok(response));
    }

    pub fn push_json(&self, target: &str, status: u16, body: &str) {
        let payload = Payload::new(body.to_string())
            .map(|payload| payload.with_content_type("application/json"));
        self.push_response(target, RawResponse::new(status, payload));
    }

    pub fn push_status(&self, target: &str, status: u16, body: Option<&str>) {
        let payload = body.and_then(|body| Payload::new(body.to_string()));
        self.push_response(target, RawResponse::new(status, payload));
    }

    pub fn push_error(&self, target: &str, error: TransportError) {
        self.push(target, Err(error));
    }

    /// Every descriptor issued so far, in order.
    pub fn issued(&self) -> Vec<RequestDescriptor> {
        self.state().issued.clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn issue(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let mut state = self.state();
        state.issued.push(request.clone());
        state
            .scripts
            .get_mut(&request.target)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::new(
                    TransportErrorKind::Connect,
                    format!("connection refused: {}", request.target),
                ))
            })
    }
}
