//! Tests for the HTTP client module

use super::*;
use crate::error::DataSourceError;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.base_url.is_none());
    assert!(config.user_agent.starts_with("offset-infinity/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_http_client_rejects_invalid_base_url() {
    let config = HttpClientConfig::builder().base_url("not a url").build();
    let err = HttpClient::with_config(config).unwrap_err();
    assert!(err.to_string().starts_with("Invalid URL"));
}

#[test]
fn test_build_url() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com/v1/")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(client.build_url("/items"), "https://api.example.com/v1/items");
    assert_eq!(client.build_url("items"), "https://api.example.com/v1/items");
    assert_eq!(
        client.build_url("https://other.example.com/x"),
        "https://other.example.com/x"
    );
}

#[tokio::test]
async fn test_get_json_with_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("limit", "25"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": 1}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let query = vec![
        ("limit".to_string(), "25".to_string()),
        ("offset".to_string(), "0".to_string()),
    ];
    let body = client.get_json("/items", &query).await.unwrap();

    assert_eq!(body["items"][0]["id"], 1);
}

#[tokio::test]
async fn test_get_json_sends_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("Authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .header("Authorization", "Bearer token")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let body = client.get_json("items", &[]).await.unwrap();
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_json_status_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_json("/items", &[]).await.unwrap_err();

    match err {
        DataSourceError::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "down");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_json_invalid_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_json("/items", &[]).await.unwrap_err();
    assert!(matches!(err, DataSourceError::Decode { .. }));
}

#[tokio::test]
async fn test_get_json_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(50))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = client.get_json("/slow", &[]).await.unwrap_err();
    assert!(matches!(err, DataSourceError::Timeout { timeout_ms: 50 }));
    assert!(err.is_retryable());
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
    let debug = format!("{client:?}");
    assert!(debug.contains("HttpClient"));
}
