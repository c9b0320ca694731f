//! Local stand-ins for the token service and the Coolapk API.
//!
//! `/token` and `/health` mirror the token service contract. Every route
//! under `/v6/` echoes the request back as JSON so callers can check which
//! query parameters and headers arrived. Hit counters and canned responses
//! live in a shared `MockState`.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU16, AtomicUsize, Ordering},
        Arc, RwLock,
    },
    time::Instant,
};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};
use uuid::Uuid;

/// Device id the token service falls back to when none is given.
pub const DEFAULT_DEVICE_ID: &str = "sxWduByOxADMuITM5ADNy4SQzEVQgszREZjTQZENwMjMgsTat9WYphFI7kWbvFWaYByOgsDI7AyOwc2d3gXY1pVMvNFSsZTR5pUZE5mM2oWQvpnc3IkSWh0aEVFR";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenBody {
    pub token: String,
    pub elapsed_ms: u64,
}

#[derive(Default)]
struct Inner {
    token_hits: AtomicUsize,
    health_hits: AtomicUsize,
    api_hits: AtomicUsize,
    health_status: AtomicU16,
    canned_token: RwLock<Option<(u16, String)>>,
    last_device_id: RwLock<Option<String>>,
}

/// Shared handle on the mock's counters and overrides.
#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Inner>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `/token` request with `status` and the raw `body`.
    pub fn set_token_response(&self, status: u16, body: &str) {
        if let Ok(mut canned) = self.inner.canned_token.write() {
            *canned = Some((status, body.to_string()));
        }
    }

    /// Answer `/health` with `status` instead of 200.
    pub fn set_health_status(&self, status: u16) {
        self.inner.health_status.store(status, Ordering::SeqCst);
    }

    pub fn token_hits(&self) -> usize {
        self.inner.token_hits.load(Ordering::SeqCst)
    }

    pub fn health_hits(&self) -> usize {
        self.inner.health_hits.load(Ordering::SeqCst)
    }

    pub fn api_hits(&self) -> usize {
        self.inner.api_hits.load(Ordering::SeqCst)
    }

    /// Device id of the most recent `/token` request.
    pub fn last_device_id(&self) -> Option<String> {
        self.inner.last_device_id.read().ok().and_then(|id| id.clone())
    }

    fn canned_token(&self) -> Option<(u16, String)> {
        self.inner.canned_token.read().ok().and_then(|canned| canned.clone())
    }
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/token", get(issue_token).fallback(method_not_allowed))
        .route("/health", get(health))
        .route("/v6/{*path}", any(echo_api))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (status, [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(body)).into_response()
}

async fn issue_token(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.inner.token_hits.fetch_add(1, Ordering::SeqCst);
    let device_id = params
        .get("device_id")
        .cloned()
        .unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string());
    if let Ok(mut last) = state.inner.last_device_id.write() {
        *last = Some(device_id.clone());
    }

    if let Some((status, body)) = state.canned_token() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (
            status,
            [
                (header::CONTENT_TYPE, "application/json; charset=utf-8"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            body,
        )
            .into_response();
    }

    let started = Instant::now();
    let token = format!("v2{}", Uuid::new_v4().simple());
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let device: String = device_id.chars().take(16).collect();
    info!(%device, elapsed_ms, "issued token");

    let body = TokenBody { token, elapsed_ms };
    json_response(StatusCode::OK, json!(body))
}

async fn method_not_allowed() -> Response {
    json_response(StatusCode::METHOD_NOT_ALLOWED, json!({"error": "Method not allowed"}))
}

async fn health(State(state): State<MockState>) -> Response {
    state.inner.health_hits.fetch_add(1, Ordering::SeqCst);
    let status = match state.inner.health_status.load(Ordering::SeqCst) {
        0 => StatusCode::OK,
        code => StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    };
    json_response(status, json!({"status": "ok"}))
}

async fn echo_api(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.inner.api_hits.fetch_add(1, Ordering::SeqCst);
    debug!(%method, path = uri.path(), "echoing api request");

    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    json_response(
        StatusCode::OK,
        json!({
            "status": 0,
            "path": uri.path(),
            "method": method.as_str(),
            "query": query,
            "headers": headers,
            "body": body,
            "data": [],
        }),
    )
}
