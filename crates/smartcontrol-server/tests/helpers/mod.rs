//! Shared fixtures for the SmartControl integration tests
//!
//! - principal records for the in-memory store
//! - a [`FeatureState`] wired to a lazy pool that never connects
//! - request builders and response decoding

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Response},
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use smartcontrol_server::{
    access::{AccessGuard, InMemoryPrincipalStore, PrincipalRecord},
    audit::{AuditEntry, AuditRecorder, AuditSink, AuditWriteError, NewAuditEntry},
    config::{Config, UploadConfig},
    db,
    features::FeatureState,
};
use sqlx::PgPool;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADMIN_ID: i64 = 1;
pub const TECHNICIAN_ID: i64 = 2;

/// Nothing listens on port 1, so every query fails fast
pub const UNREACHABLE_DATABASE_URL: &str = "postgresql://smartcontrol@127.0.0.1:1/smartcontrol";

pub fn admin() -> PrincipalRecord {
    PrincipalRecord {
        id: ADMIN_ID,
        name: "Administrator".to_string(),
        role: "administrator".to_string(),
        permissions: None,
    }
}

pub fn technician() -> PrincipalRecord {
    PrincipalRecord {
        id: TECHNICIAN_ID,
        name: "Tec".to_string(),
        role: "technician".to_string(),
        permissions: Some(json!({"devices_create": true})),
    }
}

pub fn memory_store() -> Arc<InMemoryPrincipalStore> {
    Arc::new(
        InMemoryPrincipalStore::new()
            .with(admin())
            .with(technician()),
    )
}

/// Audit sink that keeps entries in memory
#[derive(Default)]
pub struct MemorySink {
    pub entries: Mutex<Vec<AuditEntry>>,
    next_id: AtomicI64,
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuditWriteError> {
        let stored = AuditEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            timestamp: Utc::now(),
            user_id: entry.user_id,
            username: entry.username,
            action_type: entry.action.to_string(),
            target_resource: entry.resource.to_string(),
            target_id: entry.target_id,
            details: entry.details,
        };
        self.entries.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

/// Audit sink whose every write fails
pub struct FailingSink;

#[async_trait]
impl AuditSink for FailingSink {
    async fn append(&self, _entry: NewAuditEntry) -> Result<AuditEntry, AuditWriteError> {
        Err(AuditWriteError::Unavailable("audit store offline".to_string()))
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = UNREACHABLE_DATABASE_URL.to_string();
    config.database.min_connections = 0;
    config
}

pub fn lazy_pool(config: &Config) -> PgPool {
    db::pool_options(&config.database)
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy(&config.database.url)
        .unwrap()
}

/// Feature state backed by the in-memory principal store
pub fn offline_state(store: Arc<InMemoryPrincipalStore>, uploads: UploadConfig) -> FeatureState {
    let config = test_config();
    FeatureState {
        db: lazy_pool(&config),
        guard: AccessGuard::new(store, uploads.max_bytes),
        recorder: AuditRecorder::new(Arc::new(MemorySink::default())),
        uploads,
    }
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Multipart body with one text field per `(name, value)` and an optional file
pub fn multipart_request(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    let boundary = "smartcontrol-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, contents)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn actor(id: i64) -> Value {
    json!({"id": id, "name": "ignored by the guard"})
}
