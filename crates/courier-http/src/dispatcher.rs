use std::sync::Arc;

use tracing::Instrument;

use crate::config::DispatcherConfig;
use crate::errors::DispatchError;
use crate::handler::{
    DefaultErrorHandler, ErrorFn, Handling, Resolution, SuccessFn, default_error_handler,
    resolve_failure,
};
use crate::outcome::{Failure, Outcome};
use crate::payload::Payload;
use crate::policy::SuccessPolicy;
use crate::request::RequestDescriptor;
use crate::transport::Transport;

/// The optional success and error callbacks for one request.
#[derive(Default)]
pub struct Continuations {
    on_success: Option<SuccessFn>,
    on_error: Option<ErrorFn>,
}

impl Continuations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Payload) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error<F, H>(mut self, f: F) -> Self
    where
        F: FnOnce(&Failure) -> H + Send + 'static,
        H: Into<Handling>,
    {
        self.on_error = Some(Box::new(move |failure: &Failure| -> Handling {
            f(failure).into()
        }));
        self
    }

    pub fn from_parts(on_success: Option<SuccessFn>, on_error: Option<ErrorFn>) -> Self {
        Self {
            on_success,
            on_error,
        }
    }
}

/// Issues requests and routes each outcome to exactly one terminal continuation.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    success_policy: SuccessPolicy,
    default_handler: Option<Arc<dyn DefaultErrorHandler>>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            success_policy: self.success_policy.clone(),
            default_handler: self.default_handler.clone(),
        }
    }
}

impl<T> Dispatcher<T>
where
    T: Transport + 'static,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            success_policy: SuccessPolicy::default(),
            default_handler: None,
        }
    }

    pub fn with_config(transport: T, config: &DispatcherConfig) -> Self {
        Self::new(transport).with_success_policy(config.success_policy.clone())
    }

    pub fn with_success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.success_policy = policy;
        self
    }

    /// Overrides the process-wide default handler for this dispatcher only.
    pub fn with_default_handler(mut self, handler: Arc<dyn DefaultErrorHandler>) -> Self {
        self.default_handler = Some(handler);
        self
    }

    pub fn success_policy(&self) -> &SuccessPolicy {
        &self.success_policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validates, spawns the request on the current tokio runtime and returns immediately.
    pub fn dispatch(
        &self,
        request: impl Into<RequestDescriptor>,
        on_success: Option<SuccessFn>,
        on_error: Option<ErrorFn>,
    ) -> Result<DispatchHandle, DispatchError> {
        let request = request.into();
        request.validate()?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;

        let this = self.clone();
        let continuations = Continuations::from_parts(on_success, on_error);
        let span = dispatch_span(&request);
        let task = runtime.spawn(
            async move { this.run(request, continuations).await }.instrument(span),
        );
        Ok(DispatchHandle { task })
    }

    /// Same procedure as [`Dispatcher::dispatch`], awaited inline.
    pub async fn send(
        &self,
        request: impl Into<RequestDescriptor>,
        continuations: Continuations,
    ) -> Result<Resolution, DispatchError> {
        let request = request.into();
        request.validate()?;
        let span = dispatch_span(&request);
        Ok(self.run(request, continuations).instrument(span).await)
    }

    async fn run(&self, request: RequestDescriptor, continuations: Continuations) -> Resolution {
        tracing::debug!("issuing request");
        let result = self.transport.issue(&request).await;
        let outcome = Outcome::classify(&request.target, result, &self.success_policy);

        let resolution = match outcome {
            Outcome::Success(payload) => {
                if let Some(on_success) = continuations.on_success {
                    on_success(payload);
                }
                Resolution::Succeeded
            }
            Outcome::Failure(failure) => {
                let default = self
                    .default_handler
                    .clone()
                    .unwrap_or_else(default_error_handler);
                resolve_failure(&failure, continuations.on_error, default.as_ref())
            }
        };

        tracing::debug!(resolution = resolution.as_str(), "request resolved");
        resolution
    }
}

fn dispatch_span(request: &RequestDescriptor) -> tracing::Span {
    tracing::debug_span!(
        "dispatch",
        method = request.method.as_str(),
        request_target = request.target.as_str()
    )
}

/// Handle to a spawned dispatch. Dropping it does not cancel the request.
#[derive(Debug)]
pub struct DispatchHandle {
    task: tokio::task::JoinHandle<Resolution>,
}

impl DispatchHandle {
    pub async fn join(self) -> Result<Resolution, DispatchError> {
        self.task
            .await
            .map_err(|err| DispatchError::Join(err.to_string()))
    }

    /// No continuation runs if the task is aborted before the transport resolves.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
