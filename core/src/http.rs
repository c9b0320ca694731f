//! HTTP transport types and the blocking ureq transport.
//!
//! # Design
//! Requests and responses are described as plain data. `CoolapkClient`
//! builds `HttpRequest` values and parses `HttpResponse` values; a
//! `Transport` performs the round trip in between. Keeping the I/O behind
//! one trait lets unit tests substitute an in-memory transport while the
//! production path reuses a single ureq `Agent` for every call.

use std::time::Duration;

use ureq::typestate::{WithBody, WithoutBody};
use ureq::RequestBuilder;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data. `url` already carries the
/// encoded query string.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// An HTTP response described as plain data. The body is kept as raw bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes one HTTP round trip.
///
/// Implementations must return every received status as an `HttpResponse`
/// and reserve `Err` for failures to obtain a response at all.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a single reusable `ureq::Agent`.
///
/// Connection pooling and keep-alive are left to ureq. The agent is cheap to
/// clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap a caller-built agent. It should be configured with
    /// `http_status_as_error(false)` so error statuses reach the client.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn send_without_body(
        &self,
        builder: RequestBuilder<WithoutBody>,
        request: &HttpRequest,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let builder = prepare(builder, request);
        match &request.body {
            Some(body) => builder.force_send_body().send(body.as_bytes()),
            None => builder.call(),
        }
    }

    fn send_with_body(
        &self,
        builder: RequestBuilder<WithBody>,
        request: &HttpRequest,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let builder = prepare(builder, request);
        match &request.body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => self.send_without_body(self.agent.get(url), request),
            HttpMethod::Delete => self.send_without_body(self.agent.delete(url), request),
            HttpMethod::Post => self.send_with_body(self.agent.post(url), request),
            HttpMethod::Put => self.send_with_body(self.agent.put(url), request),
        };
        let mut response = result.map_err(ApiError::from)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_vec().map_err(ApiError::from)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Attach headers and the per-request timeout.
fn prepare<B>(builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    let builder = request
        .headers
        .iter()
        .fold(builder, |b, (name, value)| b.header(name.as_str(), value.as_str()));
    builder
        .config()
        .timeout_global(Some(request.timeout))
        .build()
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::BadUri(msg) => ApiError::InvalidUrl(msg),
            other => ApiError::NetworkError(other.to_string()),
        }
    }
}
