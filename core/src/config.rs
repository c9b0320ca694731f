//! Client configuration and the compiled-in app identity.
//!
//! # Design
//! The version strings, package name, and default device id identify the
//! emulated Android app to the Coolapk backend. They are fixed at compile
//! time; only the token service URL, device id, and API origin vary per
//! client instance.

use std::time::Duration;

/// Device id used when the caller does not supply one.
pub const DEFAULT_DEVICE_ID: &str = "sxWduByOxADMuITM5ADNy4SQzEVQgszREZjTQZENwMjMgsTat9WYphFI7kWbvFWaYByOgsDI7AyOwc2d3gXY1pVMvNFSsZTR5pUZE5mM2oWQvpnc3IkSWh0aEVFR";

pub const VERSION_NAME: &str = "15.9.1";
pub const VERSION_CODE: &str = "2512091";
pub const PACKAGE_NAME: &str = "com.coolapk.market";

/// Default address of the token service.
pub const DEFAULT_TOKEN_API_URL: &str = "http://localhost:8080";

/// Origin of the Coolapk mobile API.
pub const API_BASE_URL: &str = "https://api2.coolapk.com";

pub const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable settings for a `CoolapkClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    token_api_url: String,
    device_id: String,
    api_base_url: String,
}

impl ClientConfig {
    /// Configuration pointing at the token service at `token_api_url`, with
    /// the default device id and the production API origin.
    pub fn new(token_api_url: &str) -> Self {
        Self {
            token_api_url: token_api_url.trim_end_matches('/').to_string(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    /// Override the device id. An empty id falls back to the default.
    pub fn with_device_id(mut self, device_id: &str) -> Self {
        self.device_id = if device_id.is_empty() {
            DEFAULT_DEVICE_ID.to_string()
        } else {
            device_id.to_string()
        };
        self
    }

    /// Point API requests at another origin, e.g. a local mock server.
    pub fn with_api_base_url(mut self, api_base_url: &str) -> Self {
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn token_api_url(&self) -> &str {
        &self.token_api_url
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_API_URL)
    }
}
