//! Tests for the capability layer in front of mutating routes
//!
//! These tests verify:
//! - allowed principals reach the handler with the principal attached
//! - missing or unknown actors get 401 without reaching the handler
//! - principals without the capability get 403
//! - multipart bodies carry the actor as a form field

use axum::{
    body::Body,
    extract::Multipart,
    http::{Method, StatusCode},
    routing::post,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use smartcontrol_server::access::{capability, AccessGuard, Principal};
use std::sync::Arc;
use tower::ServiceExt;

mod helpers;
use helpers::*;

async fn echo_principal(Extension(principal): Extension<Principal>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "actor": principal.id,
        "name": principal.display_name,
        "model": body["model"],
    }))
}

async fn count_fields(Extension(principal): Extension<Principal>, mut form: Multipart) -> Json<Value> {
    let mut names = Vec::new();
    while let Ok(Some(field)) = form.next_field().await {
        names.push(field.name().unwrap_or_default().to_string());
    }
    Json(json!({ "actor": principal.id, "fields": names }))
}

fn app(guard: &AccessGuard) -> Router {
    Router::new()
        .route(
            "/devices",
            post(echo_principal).route_layer(guard.require(capability::DEVICES_CREATE)),
        )
        .route(
            "/devices/delete",
            post(echo_principal).route_layer(guard.require(capability::DEVICES_DELETE)),
        )
        .route(
            "/devices/import",
            post(count_fields).route_layer(guard.require(capability::DEVICES_IMPORT)),
        )
}

fn guard() -> (AccessGuard, Arc<smartcontrol_server::access::InMemoryPrincipalStore>) {
    let store = memory_store();
    (AccessGuard::new(store.clone(), 1024 * 1024), store)
}

#[tokio::test]
async fn test_technician_with_capability_is_allowed() {
    let (guard, _) = guard();
    let response = app(&guard)
        .oneshot(json_request(
            Method::POST,
            "/devices",
            json!({"currentUser": actor(TECHNICIAN_ID), "model": "Moto G"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["actor"], TECHNICIAN_ID);
    // the display name comes from the store, not the payload
    assert_eq!(body["name"], "Tec");
    // the body reaches the handler unchanged
    assert_eq!(body["model"], "Moto G");
}

#[tokio::test]
async fn test_technician_without_capability_is_forbidden() {
    let (guard, _) = guard();
    let response = app(&guard)
        .oneshot(json_request(
            Method::POST,
            "/devices/delete",
            json!({"currentUser": actor(TECHNICIAN_ID)}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_administrator_bypasses_permissions() {
    let (guard, _) = guard();
    let response = app(&guard)
        .oneshot(json_request(
            Method::POST,
            "/devices/delete",
            json!({"currentUser": actor(ADMIN_ID)}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_request_is_unauthorized_without_lookup() {
    let (guard, store) = guard();

    let empty = app(&guard)
        .oneshot(json_request(Method::POST, "/devices", json!({"model": "X"})))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::UNAUTHORIZED);

    let no_body = app(&guard)
        .oneshot(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/devices")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(no_body.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_unknown_actor_is_unauthorized() {
    let (guard, store) = guard();
    let response = app(&guard)
        .oneshot(json_request(
            Method::POST,
            "/devices",
            json!({"currentUser": actor(99)}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.lookups(), 1);
}

#[tokio::test]
async fn test_revoked_principal_is_rejected_on_next_request() {
    let (guard, store) = guard();
    let request = || {
        json_request(
            Method::POST,
            "/devices",
            json!({"currentUser": actor(TECHNICIAN_ID)}),
        )
    };

    let first = app(&guard).oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    store.remove(TECHNICIAN_ID);
    let second = app(&guard).oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_multipart_actor_field() {
    let (guard, _) = guard();
    let actor_field = actor(ADMIN_ID).to_string();
    let response = app(&guard)
        .oneshot(multipart_request(
            "/devices/import",
            &[("currentUser", &actor_field)],
            Some(("devices.csv", b"model,imei1,condition\n")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["actor"], ADMIN_ID);
    assert_eq!(body["fields"], json!(["currentUser", "file"]));
}

#[tokio::test]
async fn test_multipart_without_actor_is_unauthorized() {
    let (guard, _) = guard();
    let response = app(&guard)
        .oneshot(multipart_request(
            "/devices/import",
            &[],
            Some(("devices.csv", b"model,imei1,condition\n")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let store = memory_store();
    let guard = AccessGuard::new(store.clone(), 64);
    let padding = "x".repeat(512);
    let response = app(&guard)
        .oneshot(json_request(
            Method::POST,
            "/devices",
            json!({"currentUser": actor(ADMIN_ID), "notes": padding}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_unreadable_body_is_bad_request() {
    let store = memory_store();
    let guard = AccessGuard::new(store.clone(), 1024);
    let chunks = futures::stream::iter(vec![
        Ok::<_, std::io::Error>(axum::body::Bytes::from_static(b"{\"currentUser\":")),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
    ]);
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/devices")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(chunks))
        .unwrap();

    let response = app(&guard).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.lookups(), 0);
}
