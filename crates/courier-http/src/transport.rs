use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DispatcherConfig;
use crate::errors::{ConfigError, TransportError, TransportErrorKind};
use crate::outcome::RawResponse;
use crate::payload::Payload;
use crate::request::{Method, RequestDescriptor};

/// Issues one request and resolves once with a response or a transport error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn issue(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn issue(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        (**self).issue(request).await
    }
}

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &DispatcherConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| {
                TransportError::new(
                    TransportErrorKind::Other,
                    format!("http client build failed: {err}"),
                )
            })?;
        Ok(Self { client })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let config = DispatcherConfig::from_env()?;
        Self::new(&config).map_err(|err| ConfigError::InvalidValue {
            key: "transport",
            value: err.to_string(),
        })
    }

    fn build(&self, request: &RequestDescriptor) -> reqwest::RequestBuilder {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
        };

        let mut builder = self.client.request(method, request.target.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn issue(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let response = self
            .build(request)
            .send()
            .await
            .map_err(|err| map_reqwest_error(&err, "http send failed"))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| map_reqwest_error(&err, "http read body failed"))?;

        let payload = Payload::new(bytes).map(|payload| match content_type {
            Some(content_type) => payload.with_content_type(content_type),
            None => payload,
        });
        Ok(RawResponse::new(status, payload))
    }
}

fn map_reqwest_error(err: &reqwest::Error, context: &str) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, format!("{context}: {err}"))
}
