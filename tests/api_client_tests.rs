//! Integration tests for the HTTP API client against a mock server

use std::time::Duration;

use feedloader::config::ApiConfig;
use feedloader::datafetch::{ApiClient, PageSource, Pages};
use feedloader::IngestError;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        token: "test-token".to_string(),
        page_size: 2,
        schema_timeout: Duration::from_secs(5),
        data_timeout: Duration::from_secs(5),
    }
}

fn create_test_client(base_url: &str) -> ApiClient {
    let http_client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to create HTTP client");
    ApiClient::with_client(&api_config(base_url), http_client)
}

#[tokio::test]
async fn test_fetch_schema_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schema"))
        .and(header("x-api-key", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": [
                {"name": "id", "type": "integer"},
                {"name": "amount", "type": "decimal"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let columns = client.fetch_schema().await.unwrap();

    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name, "id");
    assert_eq!(columns[1].declared_type, "decimal");
}

#[tokio::test]
async fn test_fetch_schema_trailing_slash_in_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schema"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"columns": []})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&format!("{}/", mock_server.uri()));
    assert!(client.fetch_schema().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_schema_bad_shape_carries_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schema"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": ["id"]})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client.fetch_schema().await.unwrap_err();

    match err {
        IngestError::SchemaFormat { body, .. } => assert!(body.contains("fields")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_schema_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schema"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client.fetch_schema().await.unwrap_err();

    match err {
        IngestError::Transport { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid key");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_page_sends_paging_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dados"))
        .and(query_param("page", "3"))
        .and(query_param("page_size", "50"))
        .and(header("x-api-key", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let body = client.fetch_page(3, 50).await.unwrap();

    assert_eq!(body, json!([{"id": 1}]));
}

#[tokio::test]
async fn test_pages_over_http_until_empty() {
    let mock_server = MockServer::start().await;

    for (page, body) in [
        ("1", json!([{"id": 1}, {"id": 2}])),
        ("2", json!([{"id": 3}])),
        ("3", json!([])),
    ] {
        Mock::given(method("GET"))
            .and(path("/dados"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = create_test_client(&mock_server.uri());
    let mut pages = Pages::new(&client, 2);

    let mut batches = Vec::new();
    while let Some(batch) = pages.next_batch().await.unwrap() {
        batches.push(batch.len());
    }

    assert_eq!(batches, vec![2, 1]);
}

#[tokio::test]
async fn test_data_page_http_error_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dados"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let mut pages = Pages::new(&client, 2);

    let err = pages.next_batch().await.unwrap_err();
    assert!(matches!(err, IngestError::Transport { status: 500, .. }));
}

#[tokio::test]
async fn test_data_page_non_json_is_format_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dados"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client.fetch_page(1, 2).await.unwrap_err();
    assert!(matches!(err, IngestError::TransportFormat { page: 1 }));
}
