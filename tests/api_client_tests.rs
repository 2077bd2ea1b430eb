mod common;

use common::{can_bind_localhost, config_for};
use httpmock::Method::POST;
use httpmock::MockServer;
use megalink::api::{folder_query, ApiClient, FileInfoRequest, FileInfoResponse};
use megalink::{ClientConfig, MegaError};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn request_is_wrapped_and_unwrapped() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/cs")
                .query_param_exists("id")
                .header("content-type", "application/json")
                .json_body(json!([{"a": "g", "g": 1, "p": "AbCd1234"}]));
            then.status(200).body(
                r#"[{"s":1024,"at":"ATTRS","msd":0,"g":"https://example/content"}]"#,
            );
        })
        .await;

    let api = ApiClient::with_config(&config_for(&server)).unwrap();
    let resp: FileInfoResponse = api
        .request(&FileInfoRequest::by_public_handle("AbCd1234"), &[])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.size, 1024);
    assert_eq!(resp.attributes, "ATTRS");
    assert_eq!(resp.url, "https://example/content");
}

#[tokio::test]
async fn folder_scope_is_sent_as_query() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/cs")
                .query_param_exists("id")
                .query_param("n", "FoLdEr01")
                .query_param_exists("ec")
                .query_param("v", "2")
                .query_param("domain", "meganz")
                .json_body(json!([{"a": "g", "g": 1, "n": "NoDe0001"}]));
            then.status(200)
                .body(r#"[{"s":5,"at":"x","g":"https://example/n"}]"#);
        })
        .await;

    let api = ApiClient::with_config(&config_for(&server)).unwrap();
    let resp: FileInfoResponse = api
        .request(
            &FileInfoRequest::by_node_handle("NoDe0001"),
            &folder_query("FoLdEr01"),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.size, 5);
    assert_eq!(resp.msd, 0);
}

#[tokio::test]
async fn bare_integer_is_api_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/cs");
            then.status(200).body("[-9]");
        })
        .await;

    let api = ApiClient::with_config(&config_for(&server)).unwrap();
    let result: Result<FileInfoResponse, _> = api
        .request(&FileInfoRequest::by_public_handle("AbCd1234"), &[])
        .await;
    assert!(matches!(result, Err(MegaError::ApiError)));
}

#[tokio::test]
async fn non_success_status_is_http_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/cs");
            then.status(503).body("busy");
        })
        .await;

    let api = ApiClient::with_config(&config_for(&server)).unwrap();
    let result: Result<FileInfoResponse, _> = api
        .request(&FileInfoRequest::by_public_handle("AbCd1234"), &[])
        .await;
    assert!(matches!(result, Err(MegaError::HttpError(503))));
}

#[tokio::test]
async fn malformed_body_is_json_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/cs");
            then.status(200).body(r#"[{"unexpected":true}]"#);
        })
        .await;

    let api = ApiClient::with_config(&config_for(&server)).unwrap();
    let result: Result<FileInfoResponse, _> = api
        .request(&FileInfoRequest::by_public_handle("AbCd1234"), &[])
        .await;
    assert!(matches!(result, Err(MegaError::JsonError(_))));
}

#[tokio::test]
async fn slow_server_hits_deadline() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/cs");
            then.status(200)
                .delay(Duration::from_secs(5))
                .body(r#"[{"s":1,"at":"x","g":"u"}]"#);
        })
        .await;

    let config = ClientConfig::default()
        .with_api_url(server.base_url())
        .with_timeout(Duration::from_millis(100));
    let api = ApiClient::with_config(&config).unwrap();
    let result: Result<FileInfoResponse, _> = api
        .request(&FileInfoRequest::by_public_handle("AbCd1234"), &[])
        .await;
    assert!(matches!(result, Err(MegaError::Timeout)));
}
