//! Tests for the HTTP module

use super::*;
use crate::error::Error;
use crate::request::{FileWrapper, RequestBuilder};
use crate::types::BackoffType;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_some());
    assert!(config.user_agent.starts_with("sdk-runtime/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_calculate_backoff() {
    let client = |backoff_type| {
        let config = HttpClientConfig::builder()
            .backoff(
                backoff_type,
                Duration::from_millis(100),
                Duration::from_millis(500),
            )
            .no_rate_limit()
            .build();
        HttpClient::with_config(config).unwrap()
    };

    let constant = client(BackoffType::Constant);
    assert_eq!(constant.calculate_backoff(5), Duration::from_millis(100));

    let linear = client(BackoffType::Linear);
    assert_eq!(linear.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(linear.calculate_backoff(2), Duration::from_millis(300));

    let exponential = client(BackoffType::Exponential);
    assert_eq!(exponential.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(exponential.calculate_backoff(2), Duration::from_millis(400));
    // capped at max
    assert_eq!(exponential.calculate_backoff(10), Duration::from_millis(500));
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::new().unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(client.has_rate_limiter());
}

#[test]
fn test_url_for_without_base_needs_absolute_path() {
    let client = HttpClient::with_config(HttpClientConfig::builder().no_rate_limit().build()).unwrap();
    assert!(client.url_for(&RequestBuilder::get("/relative")).is_err());
    assert!(client
        .url_for(&RequestBuilder::get("https://api.example.com/items"))
        .is_ok());
}

// ============================================================================
// Response Tests
// ============================================================================

#[test]
fn test_response_accessors() {
    let response = HttpResponse::new(200, r#"{"items": [1, 2]}"#)
        .with_header("content-type", "application/json")
        .with_header("link", "<https://x/?page=2>");

    assert!(response.is_success());
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.text(), r#"{"items": [1, 2]}"#);

    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["items"], json!([1, 2]));

    let headers: serde_json::Value = serde_json::from_str(&response.headers_json()).unwrap();
    assert_eq!(headers["link"], json!("<https://x/?page=2>"));
}

#[test]
fn test_response_json_decode_error() {
    let response = HttpResponse::new(200, "not json");
    let err = response.json::<serde_json::Value>().unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_send_renders_path_and_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/42/items"))
        .and(query_param("limit", "10"))
        .and(query_param("status", "open"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-count", "3")
                .set_body_json(json!({"items": [1, 2, 3]})),
        )
        .mount(&mock_server)
        .await;

    let request = RequestBuilder::get("/users/{user_id}/items")
        .template_param("user_id", 42)
        .query_param("limit", 10)
        .query_param("status", "open");

    let response = client_for(&mock_server).send(&request).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.header("X-Total-Count"), Some("3"));
}

#[tokio::test]
async fn test_send_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("X-API-Key", "secret123"))
        .and(header("X-Request-Id", "req-456"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .header("X-API-Key", "secret123")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let request = RequestBuilder::get("/secure").header("X-Request-Id", "req-456");
    let response = client.send(&request).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_send_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({"page": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 123})))
        .mount(&mock_server)
        .await;

    let request = RequestBuilder::post("/search").json_body(json!({"page": 2}));
    let created: serde_json::Value = client_for(&mock_server).send_json(&request).await.unwrap();
    assert_eq!(created["id"], 123);
}

#[tokio::test]
async fn test_send_form_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let request = RequestBuilder::post("/token").form_param("grant_type", "client_credentials");
    let response = client_for(&mock_server).send(&request).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_send_multipart_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("filename=\"report.csv\""))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let request = RequestBuilder::post("/upload").form_param("title", "q3").form_file(
        "file",
        FileWrapper::new("a,b\n1,2\n")
            .with_file_name("report.csv")
            .with_content_type("text/csv"),
    );
    let response = client_for(&mock_server).send(&request).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_send_404_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .send(&RequestBuilder::get("/missing"))
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not found");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_send_retries_on_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server)
        .send(&RequestBuilder::get("/flaky"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_send_rate_limit_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let response = client_for(&mock_server)
        .send(&RequestBuilder::get("/limited"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_send_gives_up_after_max_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/always-fail"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(4)
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .send(&RequestBuilder::get("/always-fail"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_send_with_rate_limiter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .rate_limit(RateLimiterConfig::new(100, 10))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    for _ in 0..3 {
        let response = client.send(&RequestBuilder::get("/data")).await.unwrap();
        assert_eq!(response.status(), 200);
    }
}
