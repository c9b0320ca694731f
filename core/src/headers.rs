//! The fixed header set the Coolapk API fingerprints requests on.

use crate::config::{PACKAGE_NAME, VERSION_CODE, VERSION_NAME};

/// Ordered header name/value pairs sent with every API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSet(Vec<(String, String)>);

impl HeaderSet {
    /// Case-insensitive lookup by header name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

/// User-Agent of the emulated Pixel 8 running the Coolapk app.
pub fn user_agent() -> String {
    format!(
        "Dalvik/2.1.0 (Linux; U; Android 15; Pixel 8 Build/AP2A.240805.005) (#Build; google; Pixel 8; AP2A.240805.005; 15) +CoolMarket/{}-{}-universal",
        VERSION_NAME, VERSION_CODE
    )
}

/// Build the header set for `token` and `device_id`.
///
/// Names, values and order must match the app byte for byte.
pub fn coolapk_headers(token: &str, device_id: &str) -> HeaderSet {
    let pairs = [
        ("User-Agent", user_agent()),
        ("X-Requested-With", "XMLHttpRequest".to_string()),
        ("X-Sdk-Int", "35".to_string()),
        ("X-Sdk-Locale", "zh-CN".to_string()),
        ("X-App-Id", PACKAGE_NAME.to_string()),
        ("X-App-Token", token.to_string()),
        ("X-App-Version", VERSION_NAME.to_string()),
        ("X-App-Code", VERSION_CODE.to_string()),
        ("X-Api-Version", "15".to_string()),
        ("X-App-Device", device_id.to_string()),
        ("X-Dark-Mode", "0".to_string()),
        ("X-App-Channel", "coolapk".to_string()),
        ("X-App-Mode", "universal".to_string()),
        ("X-App-Supported", VERSION_CODE.to_string()),
        ("Accept-Encoding", "gzip".to_string()),
    ];
    HeaderSet(
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_and_device_land_in_their_headers() {
        let headers = coolapk_headers("ABC", "DEV1");
        assert_eq!(headers.get("X-App-Token"), Some("ABC"));
        assert_eq!(headers.get("X-App-Device"), Some("DEV1"));
        assert_eq!(headers.len(), 15);
    }

    #[test]
    fn user_agent_embeds_version() {
        assert!(user_agent().ends_with("+CoolMarket/15.9.1-2512091-universal"));
        assert!(user_agent().starts_with("Dalvik/2.1.0 (Linux; U; Android 15; Pixel 8"));
    }

    #[test]
    fn lookup_ignores_case() {
        let headers = coolapk_headers("t", "d");
        assert_eq!(headers.get("x-app-id"), Some("com.coolapk.market"));
        assert_eq!(headers.get("ACCEPT-ENCODING"), Some("gzip"));
        assert_eq!(headers.get("Authorization"), None);
    }

    #[test]
    fn order_starts_with_user_agent_and_ends_with_encoding() {
        let headers = coolapk_headers("t", "d");
        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names.first(), Some(&"User-Agent"));
        assert_eq!(names.last(), Some(&"Accept-Encoding"));
    }
}
