//! Router-level tests that run without a database
//!
//! The pool points at a closed port, so these cover everything decided
//! before the first query: guard outcomes, error envelopes, the health
//! check and the dashboard fallback.

use axum::http::{Method, StatusCode};
use serde_json::json;
use smartcontrol_server::{config::UploadConfig, server};
use tower::ServiceExt;

mod helpers;
use helpers::*;

fn app() -> axum::Router {
    let config = test_config();
    let state = offline_state(memory_store(), config.uploads.clone());
    server::create_app(state, &config)
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_mutation_without_actor_is_unauthorized() {
    let response = app()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/devices",
            json!({"model": "Moto G", "imei1": "3520990000001", "condition": "New"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_missing_capability_is_forbidden_on_every_slice() {
    let cases = [
        (Method::DELETE, "/api/v1/devices/3520990000001"),
        (Method::POST, "/api/v1/employees"),
        (Method::PUT, "/api/v1/lines/4"),
        (Method::POST, "/api/v1/records"),
        (Method::DELETE, "/api/v1/maintenance/9"),
        (Method::POST, "/api/v1/line-records"),
        (Method::PUT, "/api/v1/company"),
        (Method::DELETE, "/api/v1/users/5"),
    ];

    for (method, uri) in cases {
        let response = app()
            .oneshot(json_request(
                method.clone(),
                uri,
                json!({"currentUser": actor(TECHNICIAN_ID)}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_allowed_mutation_reaches_validation() {
    // allowed by the guard, then rejected before any query runs
    let response = app()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/devices",
            json!({"currentUser": actor(TECHNICIAN_ID), "model": "Moto G", "condition": "Broken"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_primary_administrator_cannot_be_deleted() {
    let response = app()
        .oneshot(json_request(
            Method::DELETE,
            "/api/v1/users/1",
            json!({"currentUser": actor(ADMIN_ID)}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_dashboard_falls_back_to_zeroes() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/api/v1/dashboard/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totalDevices"], 0);
    assert_eq!(body["data"]["deviceStatusSummary"]["inUse"], 0);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let response = app()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({"username": "admin"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_stores_allowed_file() {
    let dir = tempfile::tempdir().unwrap();
    let uploads = UploadConfig {
        dir: dir.path().to_path_buf(),
        max_bytes: 1024 * 1024,
    };
    let mut config = test_config();
    config.uploads = uploads.clone();
    let app = server::create_app(offline_state(memory_store(), uploads), &config);

    let response = app
        .clone()
        .oneshot(multipart_request("/api/v1/upload", &[], Some(("Term 01.pdf", b"%PDF-1.4"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let url = body["data"]["fileUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with("_Term_01.pdf"));

    let served = app.oneshot(empty_request(Method::GET, &url)).await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);

    let rejected = server::create_app(
        offline_state(
            memory_store(),
            UploadConfig {
                dir: dir.path().to_path_buf(),
                max_bytes: 1024 * 1024,
            },
        ),
        &config,
    )
    .oneshot(multipart_request("/api/v1/upload", &[], Some(("run.exe", b"MZ"))))
    .await
    .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}
