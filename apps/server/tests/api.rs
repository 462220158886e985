use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tokio::net::TcpListener;
use tower::ServiceExt;
use omie_core::credentials::Credentials;
use omie_core::logs::LogStatus;
use omie_server::{api::app_router, build_state, config::Config};

const UNREACHABLE: &str = "http://127.0.0.1:1";

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = Config {
        store_path: tmp.path().join("store.json"),
        api_base_url: format!("{}/api/v1", UNREACHABLE),
        api_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        sync_on_start: false,
        ..Config::default()
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn healthz_responds() {
    let (app, _tmp) = build_test_router().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn credentials_are_returned_masked() {
    let (app, _tmp) = build_test_router().await;

    let (status, saved) = send(
        &app,
        Method::PUT,
        "/api/v1/credentials",
        Some(json!({
            "appKey": " 123456 ",
            "appSecret": "abcdefgh9876",
            "useProxy": true,
            "proxyUrl": UNREACHABLE,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["appKey"], "123456");
    assert_eq!(saved["appSecret"], "****9876");

    let (status, current) = send(&app, Method::GET, "/api/v1/credentials", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["appSecret"], "****9876");
}

#[tokio::test]
async fn console_rejects_malformed_json_and_logs_it() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/console",
        Some(json!({ "service": "CLIENTS", "param": "{ not json" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (_, logs) = send(&app, Method::GET, "/api/v1/logs", None).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs[0]["method"], "JSON_ERRO");
    assert_eq!(logs[0]["status"], "error");
}

#[tokio::test]
async fn sync_without_credentials_is_skipped() {
    let (app, _tmp) = build_test_router().await;

    let (status, outcome) = send(&app, Method::POST, "/api/v1/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "skipped");
    assert_eq!(outcome["reason"], "missingCredentials");
}

#[tokio::test]
async fn profiles_can_be_created_listed_and_deleted() {
    let (app, _tmp) = build_test_router().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/profiles",
        Some(json!({
            "name": "Matriz",
            "credentials": { "appKey": "111", "appSecret": "secret-4321" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Matriz");
    assert_eq!(created["appSecret"], "****4321");
    let id = created["id"].as_str().unwrap().to_string();

    let (_, listed) = send(&app, Method::GET, "/api/v1/profiles", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["appSecret"], "****4321");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/profiles/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/profiles/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn profile_without_name_is_rejected() {
    let (app, _tmp) = build_test_router().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/profiles",
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_dashboard_reports_zero_totals() {
    let (app, _tmp) = build_test_router().await;

    let (status, dashboard) = send(&app, Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["syncing"], false);
    assert!(dashboard["lastSyncedAt"].is_null());

    let (_, receivables) = send(&app, Method::GET, "/api/v1/receivables", None).await;
    assert_eq!(receivables, json!([]));
    let (_, balances) = send(&app, Method::GET, "/api/v1/search/balances?q=acme", None).await;
    assert_eq!(balances, json!([]));
}

#[tokio::test]
async fn clearing_data_forgets_credentials_and_logs() {
    let (app, _tmp) = build_test_router().await;

    send(
        &app,
        Method::POST,
        "/api/v1/profiles",
        Some(json!({
            "name": "Filial",
            "credentials": { "appKey": "222", "appSecret": "secret-0000" },
        })),
    )
    .await;
    let (_, logs) = send(&app, Method::GET, "/api/v1/logs", None).await;
    assert!(!logs.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::DELETE, "/api/v1/data", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, logs) = send(&app, Method::GET, "/api/v1/logs", None).await;
    assert_eq!(logs, json!([]));
    let (_, profiles) = send(&app, Method::GET, "/api/v1/profiles", None).await;
    assert_eq!(profiles, json!([]));
    let (_, credentials) = send(&app, Method::GET, "/api/v1/credentials", None).await;
    assert_eq!(credentials["appKey"], "");
    assert_eq!(credentials["appSecret"], "");
}

/// Accepts connections and never answers them.
async fn silent_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn sync_outlives_a_timed_out_request() {
    let upstream = silent_upstream().await;
    let tmp = tempdir().unwrap();
    let config = Config {
        store_path: tmp.path().join("store.json"),
        api_base_url: format!("{}/api/v1", upstream),
        api_timeout: Duration::from_millis(300),
        request_timeout: Duration::from_millis(200),
        sync_on_start: false,
        ..Config::default()
    };
    let state = build_state(&config).await.unwrap();
    state
        .credentials_service
        .save(Credentials::new("app-key", "app-secret").with_proxy(false, upstream.clone()))
        .unwrap();
    let app = app_router(state.clone(), &config);

    let (status, _) = send(&app, Method::POST, "/api/v1/sync", None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    let mut outcome = None;
    for _ in 0..50 {
        outcome = state
            .log_service
            .list()
            .into_iter()
            .find(|l| l.method == "API_SYNC");
        if outcome.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let outcome = outcome.expect("the sync finished and logged its outcome");
    assert_eq!(outcome.status, LogStatus::Error);
    assert!(state.credentials_service.active().use_proxy);
    assert!(state
        .log_service
        .list()
        .iter()
        .any(|l| l.method == "CORS_AUTO" && l.status == LogStatus::Pending));
    assert!(!state.sync_orchestrator.is_running());
}
