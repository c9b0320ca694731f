//! Blocking client for the Coolapk mobile API.
//!
//! # Overview
//! Fetches an `X-App-Token` from a helper token service, attaches the fixed
//! header set the Coolapk app sends, and forwards requests to
//! `https://api2.coolapk.com`, returning the decoded JSON.
//!
//! # Design
//! - `CoolapkClient` holds an immutable `ClientConfig` and one `Transport`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `UreqTransport` is the production transport; a single `ureq::Agent` is
//!   reused for every call.
//! - Tokens are never cached.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod types;

pub use client::CoolapkClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use headers::HeaderSet;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{ApiResponse, ApiSummary, HealthStatus, TokenResponse};
