//! JSON-over-HTTP client seam. Every verb resolves to parsed JSON, `None` for an empty
//! success body, or a [`RequestError`] for anything outside the 2xx range.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            token: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }
}

/// A failed round-trip. Callers treat every variant as "request failed"; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Request failed: {method} {url} returned HTTP {status}")]
    Status {
        method: Method,
        url: String,
        status: u16,
    },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Request failed: could not encode request body: {0}")]
    Encode(String),
    #[error("Request failed: unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, RequestError>;

    async fn get(&self, url: &str, token: &str) -> Result<Option<Value>, RequestError> {
        self.send(ApiRequest::new(Method::Get, url).with_token(Some(token)))
            .await
    }

    async fn post(
        &self,
        url: &str,
        body: Value,
        token: Option<&str>,
    ) -> Result<Option<Value>, RequestError> {
        self.send(
            ApiRequest::new(Method::Post, url)
                .with_body(body)
                .with_token(token),
        )
        .await
    }

    async fn put(&self, url: &str, body: Value, token: &str) -> Result<Option<Value>, RequestError> {
        self.send(
            ApiRequest::new(Method::Put, url)
                .with_body(body)
                .with_token(Some(token)),
        )
        .await
    }

    async fn delete(&self, url: &str, token: &str) -> Result<Option<Value>, RequestError> {
        self.send(ApiRequest::new(Method::Delete, url).with_token(Some(token)))
            .await
    }
}

pub fn encode<T: Serialize>(value: &T) -> Result<Value, RequestError> {
    serde_json::to_value(value).map_err(|err| RequestError::Encode(err.to_string()))
}

/// Decode a response body, treating an empty body as a protocol error.
pub fn decode<T: DeserializeOwned>(url: &str, body: Option<Value>) -> Result<T, RequestError> {
    let body = body.ok_or_else(|| RequestError::Decode {
        url: url.to_string(),
        message: "empty response body".to_string(),
    })?;
    serde_json::from_value(body).map_err(|err| RequestError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}

/// `Bearer <token>` by default; an empty scheme sends the raw token.
pub fn authorization_value(scheme: &str, token: &str) -> String {
    let scheme = scheme.trim();
    if scheme.is_empty() {
        token.to_string()
    } else {
        format!("{} {}", scheme, token)
    }
}

fn parse_body(url: &str, status: u16, bytes: &[u8]) -> Result<Option<Value>, RequestError> {
    if status == 204 || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|err| RequestError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
}

/// [`ApiClient`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    auth_scheme: String,
}

impl HttpClient {
    pub fn new(timeout: Option<Duration>, auth_scheme: impl Into<String>) -> Result<Self, RequestError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let inner = builder
            .build()
            .map_err(|err| RequestError::Transport(err.to_string()))?;
        Ok(Self {
            inner,
            auth_scheme: auth_scheme.into(),
        })
    }
}

#[async_trait]
impl ApiClient for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, RequestError> {
        debug!(method = %request.method, url = request.url.as_str(), "sending request");

        let mut builder = self
            .inner
            .request(request.method.into(), request.url.as_str());
        if let Some(token) = request.token.as_deref() {
            builder = builder.header(AUTHORIZATION, authorization_value(&self.auth_scheme, token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| RequestError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            debug!(url = request.url.as_str(), status = status.as_u16(), "request rejected");
            return Err(RequestError::Status {
                method: request.method,
                url: request.url,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| RequestError::Transport(err.to_string()))?;
        parse_body(&request.url, status.as_u16(), &bytes)
    }
}
