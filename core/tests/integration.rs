//! Client operations against the live mock server.
//!
//! # Design
//! Starts the mock token service and echo API on a random port, then drives
//! the blocking client over real HTTP. The echo API reflects query
//! parameters and headers back, so each test checks what actually went over
//! the wire. Hit counters on `MockState` count token and API round trips.

use coolapk_core::config::DEFAULT_DEVICE_ID;
use coolapk_core::{ApiError, ApiSummary, ClientConfig, CoolapkClient, HealthStatus, HttpMethod};
use mock_server::MockState;
use serde_json::Value;

/// Start the mock server on a random port and return its base URL.
fn start_mock(state: MockState) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, state).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// Serve `body` with status 200 to every connection on a raw socket.
/// Used where the mock server cannot produce the bytes needed.
fn serve_raw(body: &'static [u8]) -> String {
    use std::io::{BufRead, BufReader, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
        }
    });

    format!("http://{addr}")
}

/// Client whose token service and API origin both point at the mock.
fn client_for(base: &str) -> CoolapkClient {
    CoolapkClient::new(ClientConfig::new(base).with_api_base_url(base))
}

#[test]
fn feed_detail_end_to_end() {
    let state = MockState::new();
    state.set_token_response(200, r#"{"token":"T1"}"#);
    let base = start_mock(state.clone());
    let client = client_for(&base);

    let body = client.get_feed(12345).unwrap();

    assert_eq!(state.token_hits(), 1);
    assert_eq!(state.api_hits(), 1);
    assert_eq!(body["path"], "/v6/feed/detail");
    assert_eq!(body["query"], serde_json::json!({"id": "12345"}));
    assert_eq!(body["headers"]["x-app-token"], "T1");
    assert_eq!(body["headers"]["x-app-device"], DEFAULT_DEVICE_ID);
}

#[test]
fn wire_headers_match_the_app() {
    let base = start_mock(MockState::new());
    let client = CoolapkClient::new(
        ClientConfig::new(&base)
            .with_api_base_url(&base)
            .with_device_id("DEV1"),
    );

    let body = client
        .request_api("/v6/main/init", HttpMethod::Get, None, None, Some("ABC"))
        .unwrap();
    let headers = &body["headers"];

    let expected = client.get_headers(Some("ABC")).unwrap();
    for (name, value) in expected.iter() {
        assert_eq!(headers[name.to_ascii_lowercase()], value, "header {name}");
    }
}

#[test]
fn explicit_token_skips_token_service() {
    let state = MockState::new();
    let base = start_mock(state.clone());
    let client = client_for(&base);

    let body = client
        .request_api("/v6/main/init", HttpMethod::Get, None, None, Some("MINE"))
        .unwrap();

    assert_eq!(body["headers"]["x-app-token"], "MINE");
    assert_eq!(state.token_hits(), 0);
    assert_eq!(state.api_hits(), 1);
}

#[test]
fn every_call_fetches_a_fresh_token() {
    let state = MockState::new();
    let base = start_mock(state.clone());
    let client = client_for(&base);

    let first = client.get_feed(1).unwrap();
    let second = client.get_feed(2).unwrap();

    assert_eq!(state.token_hits(), 2);
    assert_ne!(first["headers"]["x-app-token"], second["headers"]["x-app-token"]);
}

#[test]
fn index_sends_feed_parameters() {
    let state = MockState::new();
    let base = start_mock(state.clone());
    let client = client_for(&base);

    let before = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let body = client.get_index(3).unwrap();
    let after = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis();

    assert_eq!(body["path"], "/v6/main/indexV8");
    let query = &body["query"];
    assert_eq!(query["page"], "3");
    assert_eq!(query["firstLaunch"], "0");
    assert_eq!(query["ids"], "");
    let install: u128 = query["installTime"].as_str().unwrap().parse().unwrap();
    assert!(install >= before && install <= after);

    assert_eq!(ApiSummary::from_response(&body), ApiSummary::Items(0));
}

#[test]
fn search_sends_keyword_and_filters() {
    let base = start_mock(MockState::new());
    let client = client_for(&base);

    let body = client.search("foo bar", 2).unwrap();

    assert_eq!(body["path"], "/v6/search");
    assert_eq!(
        body["query"],
        serde_json::json!({
            "type": "all",
            "feedType": "all",
            "sort": "default",
            "searchValue": "foo bar",
            "page": "2",
        })
    );
}

#[test]
fn post_sends_form_body() {
    let base = start_mock(MockState::new());
    let client = client_for(&base);

    let data = [("message", "你好 world".to_string()), ("id", "5".to_string())];
    let body = client
        .request_api("/v6/feed/reply", HttpMethod::Post, None, Some(&data[..]), Some("T"))
        .unwrap();

    assert_eq!(body["method"], "POST");
    assert_eq!(body["headers"]["content-type"], "application/x-www-form-urlencoded");
    let form: Vec<(String, String)> = url::form_urlencoded::parse(body["body"].as_str().unwrap().as_bytes())
        .into_owned()
        .collect();
    assert_eq!(
        form,
        vec![
            ("message".to_string(), "你好 world".to_string()),
            ("id".to_string(), "5".to_string()),
        ]
    );
}

#[test]
fn token_uses_requested_device() {
    let state = MockState::new();
    let base = start_mock(state.clone());
    let client = client_for(&base);

    let token = client.get_token(Some("DEV7")).unwrap();
    assert!(token.starts_with("v2"));
    assert_eq!(state.last_device_id().as_deref(), Some("DEV7"));

    client.get_token(None).unwrap();
    assert_eq!(state.last_device_id().as_deref(), Some(DEFAULT_DEVICE_ID));
}

#[test]
fn token_service_failure_stops_before_api() {
    let state = MockState::new();
    state.set_token_response(500, r#"{"error":"Failed to generate token"}"#);
    let base = start_mock(state.clone());
    let client = client_for(&base);

    let err = client.get_index(1).unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 500, .. }), "got {err:?}");
    assert_eq!(state.api_hits(), 0);
}

#[test]
fn token_without_key_is_deserialization_error() {
    let state = MockState::new();
    state.set_token_response(200, r#"{"elapsed_ms":5}"#);
    let base = start_mock(state);
    let client = client_for(&base);

    let err = client.get_token(None).unwrap_err();
    assert!(matches!(err, ApiError::DeserializationError(_)), "got {err:?}");
}

#[test]
fn unknown_endpoint_is_http_error() {
    let base = start_mock(MockState::new());
    let client = client_for(&base);

    let err = client
        .request_api("/v5/missing", HttpMethod::Get, None, None, Some("T"))
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn health_check_reflects_service_state() {
    let state = MockState::new();
    let base = start_mock(state.clone());
    let client = client_for(&base);

    assert!(client.health_check());
    assert_eq!(client.health().unwrap(), HealthStatus::Healthy);

    state.set_health_status(204);
    assert!(!client.health_check());
    assert_eq!(client.health().unwrap(), HealthStatus::Unhealthy(204));
    assert_eq!(state.health_hits(), 4);
}

#[test]
fn health_check_is_false_when_nothing_listens() {
    // Bind then drop to get a port with no listener.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = CoolapkClient::new(ClientConfig::new(&format!("http://127.0.0.1:{port}")));

    assert!(!client.health_check());
    assert_eq!(client.health().unwrap(), HealthStatus::Unreachable);

    let err = client.get_token(None).unwrap_err();
    assert!(matches!(err, ApiError::NetworkError(_)), "got {err:?}");
}

#[test]
fn response_body_is_returned_verbatim() {
    let base = start_mock(MockState::new());
    let client = client_for(&base);

    let body: Value = client.get_feed(9).unwrap();
    assert!(body.is_object());
    assert_eq!(body["status"], 0);
}

#[test]
fn health_ignores_binary_body() {
    let base = serve_raw(b"\xff\xfe\x00ok");
    let client = client_for(&base);

    assert!(client.health_check());
    assert_eq!(client.health().unwrap(), HealthStatus::Healthy);
}

#[test]
fn binary_bodies_are_deserialization_errors() {
    let base = serve_raw(b"\xff\xfe not json");
    let client = client_for(&base);

    let err = client.get_token(None).unwrap_err();
    assert!(matches!(err, ApiError::DeserializationError(_)), "got {err:?}");

    let err = client
        .request_api("/v6/main/init", HttpMethod::Get, None, None, Some("T"))
        .unwrap_err();
    assert!(matches!(err, ApiError::DeserializationError(_)), "got {err:?}");
}

#[test]
fn token_timing_may_be_fractional() {
    let state = MockState::new();
    state.set_token_response(200, r#"{"token":"T","elapsed_ms":1.5}"#);
    let base = start_mock(state);
    let client = client_for(&base);

    assert_eq!(client.get_token(None).unwrap(), "T");
}
