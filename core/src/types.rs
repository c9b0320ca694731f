//! Response DTOs for the token service and helpers over API payloads.

use serde::Deserialize;
use serde_json::Value;

/// API payloads are returned verbatim.
pub type ApiResponse = Value;

/// Body of a successful `GET /token`. Extra fields are ignored and
/// `elapsed_ms` may hold any JSON value.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub elapsed_ms: Option<Value>,
}

/// Outcome of probing the token service's `/health` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// The service answered with a status other than 200.
    Unhealthy(u16),
    /// No response: connection refused, DNS failure, or timeout.
    Unreachable,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Coarse reading of a Coolapk payload, enough to report on a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiSummary {
    /// Number of entries in `data`: array length or object key count, else 0.
    Items(usize),
    Error(String),
}

impl ApiSummary {
    pub fn from_response(response: &ApiResponse) -> Self {
        let ok = response.get("status").and_then(Value::as_i64) == Some(0)
            || response.get("data").is_some();
        if ok {
            let count = match response.get("data") {
                Some(Value::Array(items)) => items.len(),
                Some(Value::Object(fields)) => fields.len(),
                _ => 0,
            };
            ApiSummary::Items(count)
        } else {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown");
            ApiSummary::Error(message.to_string())
        }
    }
}
