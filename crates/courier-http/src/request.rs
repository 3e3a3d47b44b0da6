use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;

use crate::errors::DispatchError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            other => Err(format!("unsupported method '{other}'")),
        }
    }
}

/// One outbound request. Built per call and consumed by the dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub target: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method,
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .with_header("content-type", "application/json")
            .with_body(body))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.target.trim().is_empty() {
            return Err(DispatchError::EmptyTarget);
        }
        for (name, value) in &self.headers {
            if name.trim().is_empty() {
                return Err(DispatchError::InvalidHeader(
                    "header name must not be empty".to_string(),
                ));
            }
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(DispatchError::InvalidHeader(format!("bad header name '{name}'")));
            }
            if HeaderValue::from_str(value).is_err() {
                return Err(DispatchError::InvalidHeader(format!(
                    "bad value for header '{name}'"
                )));
            }
        }
        Ok(())
    }
}

impl From<&str> for RequestDescriptor {
    fn from(target: &str) -> Self {
        Self::get(target)
    }
}

impl From<String> for RequestDescriptor {
    fn from(target: String) -> Self {
        Self::get(target)
    }
}

/// Parses `Name: value` as given on a command line.
pub fn parse_header(raw: &str) -> Result<(String, String), DispatchError> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(DispatchError::InvalidHeader(format!(
            "expected 'name: value', got '{raw}'"
        )));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(DispatchError::InvalidHeader(format!(
            "header name missing in '{raw}'"
        )));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
