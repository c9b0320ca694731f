//! Blocking client for the Coolapk mobile API.
//!
//! # Design
//! Every operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! public operation runs one round trip through the client's `Transport`
//! between the two. Nothing is cached: each call without an explicit token
//! fetches a fresh one from the token service.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};
use url::{form_urlencoded, Url};

use crate::config::{ClientConfig, API_TIMEOUT, HEALTH_TIMEOUT, TOKEN_TIMEOUT};
use crate::error::ApiError;
use crate::headers::{coolapk_headers, HeaderSet};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{ApiResponse, HealthStatus, TokenResponse};

pub const INDEX_ENDPOINT: &str = "/v6/main/indexV8";
pub const FEED_DETAIL_ENDPOINT: &str = "/v6/feed/detail";
pub const SEARCH_ENDPOINT: &str = "/v6/search";

/// Query and form parameters as ordered key/value pairs.
pub type Params<'a> = [(&'a str, String)];

/// Client for the token service and the Coolapk API.
#[derive(Debug, Clone)]
pub struct CoolapkClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl CoolapkClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl Default for CoolapkClient<UreqTransport> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<T: Transport> CoolapkClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // --- token service ---

    pub fn build_get_token(&self, device_id: Option<&str>) -> Result<HttpRequest, ApiError> {
        let device_id = device_id.unwrap_or(self.config.device_id());
        let url = build_url(
            self.config.token_api_url(),
            "/token",
            &[("device_id", device_id.to_string())],
        )?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
            timeout: TOKEN_TIMEOUT,
        })
    }

    pub fn parse_get_token(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        let parsed: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        if let Some(elapsed) = &parsed.elapsed_ms {
            debug!(elapsed_ms = %elapsed, "token issued");
        }
        Ok(parsed.token)
    }

    /// Fetch a fresh token for `device_id`, or for the configured device.
    pub fn get_token(&self, device_id: Option<&str>) -> Result<String, ApiError> {
        let request = self.build_get_token(device_id)?;
        let response = self.send(&request)?;
        self.parse_get_token(response)
    }

    pub fn build_health(&self) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: build_url(self.config.token_api_url(), "/health", &[])?,
            headers: Vec::new(),
            body: None,
            timeout: HEALTH_TIMEOUT,
        })
    }

    pub fn parse_health(&self, response: &HttpResponse) -> HealthStatus {
        if response.status == 200 {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy(response.status)
        }
    }

    /// Probe the token service. Network failures become `Unreachable`; any
    /// other error is returned.
    pub fn health(&self) -> Result<HealthStatus, ApiError> {
        let request = self.build_health()?;
        match self.send(&request) {
            Ok(response) => Ok(self.parse_health(&response)),
            Err(ApiError::NetworkError(reason)) => {
                warn!(url = %request.url, %reason, "token service unreachable");
                Ok(HealthStatus::Unreachable)
            }
            Err(e) => Err(e),
        }
    }

    /// True iff the token service answers `/health` with exactly 200.
    pub fn health_check(&self) -> bool {
        match self.health() {
            Ok(status) => status.is_healthy(),
            Err(e) => {
                warn!(error = %e, "health check failed");
                false
            }
        }
    }

    // --- target API ---

    /// Headers for an API request. Without `token`, one is fetched for the
    /// configured device id.
    pub fn get_headers(&self, token: Option<&str>) -> Result<HeaderSet, ApiError> {
        let headers = match token {
            Some(token) => coolapk_headers(token, self.config.device_id()),
            None => {
                let token = self.get_token(None)?;
                coolapk_headers(&token, self.config.device_id())
            }
        };
        Ok(headers)
    }

    pub fn build_api_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        params: Option<&Params<'_>>,
        data: Option<&Params<'_>>,
        headers: HeaderSet,
    ) -> Result<HttpRequest, ApiError> {
        let params = params.unwrap_or(&[]);
        let data = data.unwrap_or(&[]);

        let url = build_url(self.config.api_base_url(), endpoint, params)?;
        let mut headers = headers.into_vec();
        let body = if data.is_empty() {
            None
        } else {
            headers.push((
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ));
            Some(
                form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(data)
                    .finish(),
            )
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: API_TIMEOUT,
        })
    }

    pub fn parse_api_response(&self, response: HttpResponse) -> Result<ApiResponse, ApiError> {
        check_status(&response)?;
        serde_json::from_slice(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Send a request to `endpoint` on the API origin and return its JSON body.
    pub fn request_api(
        &self,
        endpoint: &str,
        method: HttpMethod,
        params: Option<&Params<'_>>,
        data: Option<&Params<'_>>,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let headers = self.get_headers(token)?;
        let request = self.build_api_request(endpoint, method, params, data, headers)?;
        let response = self.send(&request)?;
        self.parse_api_response(response)
    }

    /// Main feed page. `installTime` is the current time in milliseconds.
    pub fn get_index(&self, page: u32) -> Result<ApiResponse, ApiError> {
        let params = index_params(page, now_millis());
        self.request_api(INDEX_ENDPOINT, HttpMethod::Get, Some(params.as_slice()), None, None)
    }

    pub fn get_feed(&self, feed_id: u64) -> Result<ApiResponse, ApiError> {
        let params = [("id", feed_id.to_string())];
        self.request_api(FEED_DETAIL_ENDPOINT, HttpMethod::Get, Some(&params[..]), None, None)
    }

    pub fn search(&self, keyword: &str, page: u32) -> Result<ApiResponse, ApiError> {
        let params = search_params(keyword, page);
        self.request_api(SEARCH_ENDPOINT, HttpMethod::Get, Some(params.as_slice()), None, None)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }
}

pub fn index_params(page: u32, install_time_ms: u128) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.to_string()),
        ("firstLaunch", "0".to_string()),
        ("installTime", install_time_ms.to_string()),
        ("ids", String::new()),
    ]
}

pub fn search_params(keyword: &str, page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("type", "all".to_string()),
        ("feedType", "all".to_string()),
        ("sort", "default".to_string()),
        ("searchValue", keyword.to_string()),
        ("page", page.to_string()),
    ]
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Join `base` and `path`, then append `params` as a query string.
fn build_url(base: &str, path: &str, params: &Params<'_>) -> Result<String, ApiError> {
    let mut url = Url::parse(&format!("{base}{path}"))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url.into())
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.text(),
    })
}
