//! End-to-end tests through the full router against PostgreSQL
//!
//! Require a running PostgreSQL reachable through `DATABASE_URL`.

use axum::http::{Method, StatusCode};
use axum::Router;
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use smartcontrol_server::{
    audit::{queries, AuditRecorder},
    config::Config,
    features::FeatureState,
    server,
};
use std::sync::Arc;
use sqlx::PgPool;
use tower::ServiceExt;

mod helpers;
use helpers::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn seed_admin(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (name, username, password_hash, role) \
         VALUES ('Administrator', 'admin', 'x', 'administrator') RETURNING id",
    )
    .fetch_one(pool)
    .await
}

fn router(pool: PgPool, uploads_dir: &std::path::Path) -> Router {
    let mut config = Config::default();
    config.uploads.dir = uploads_dir.to_path_buf();
    server::create_app(FeatureState::new(pool, &config), &config)
}

async fn send(app: &Router, method: Method, uri: &str, admin: i64, body: Value) -> (StatusCode, Value) {
    let mut body = body;
    body["currentUser"] = actor(admin);
    let response = app
        .clone()
        .oneshot(json_request(method, uri, body))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app.clone().oneshot(empty_request(Method::GET, uri)).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_device_create_conflict_and_audit(pool: PgPool) -> TestResult {
    let admin = seed_admin(&pool).await?;
    let dir = tempfile::tempdir()?;
    let app = router(pool.clone(), dir.path());

    let device = json!({"model": "Moto G", "imei1": "3520990000001", "condition": "New"});
    let (status, body) = send(&app, Method::POST, "/api/v1/devices", admin, device.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "Available");

    let (status, _) = send(&app, Method::POST, "/api/v1/devices", admin, device).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let trail = queries::trail_for(&pool, "Device", "3520990000001", 10).await?;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action_type, "CREATE");
    assert_eq!(trail[0].user_id, Some(admin));
    assert_eq!(trail[0].username, "Administrator");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_device_import_summary(pool: PgPool) -> TestResult {
    let admin = seed_admin(&pool).await?;
    let dir = tempfile::tempdir()?;
    let app = router(pool.clone(), dir.path());

    let csv = b"model,imei1,condition,imei2,notes\n\
        Moto G,111,New,,\n\
        Galaxy A15,222,Defective,,cracked\n\
        Moto G,111,New,,\n\
        Nokia,333,Broken,,\n";
    let actor_field = actor(admin).to_string();
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/api/v1/devices/import",
            &[("currentUser", &actor_field)],
            Some(("devices.csv", csv)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["imported"], 2);
    assert_eq!(body["data"]["skipped"], 1);
    let failures = body["data"]["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].as_str().unwrap().starts_with("Row 5:"));

    let trail = queries::trail_for(&pool, "Device", "Multiple", 10).await?;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action_type, "IMPORT");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_assignment_lifecycle(pool: PgPool) -> TestResult {
    let admin = seed_admin(&pool).await?;
    let dir = tempfile::tempdir()?;
    let app = router(pool.clone(), dir.path());

    let (status, employee) = send(
        &app,
        Method::POST,
        "/api/v1/employees",
        admin,
        json!({"registration": "1001", "name": "Ana Lima", "position": "Field technician"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let employee_id = employee["data"]["id"].as_i64().unwrap();
    send(
        &app,
        Method::POST,
        "/api/v1/devices",
        admin,
        json!({"model": "Moto G", "imei1": "555", "condition": "New"}),
    )
    .await;

    let delivery = json!({
        "employeeRegistration": "1001",
        "deviceImei": "555",
        "deliveryDate": "2026-02-10",
        "accessories": ["charger", "case"],
    });
    let (status, body) = send(&app, Method::POST, "/api/v1/records", admin, delivery.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let record_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "In use");
    assert_eq!(body["data"]["accessories"], json!(["charger", "case"]));

    let (_, device) = get(&app, "/api/v1/devices/555").await;
    assert_eq!(device["data"]["status"], "In use");

    let (status, _) = send(&app, Method::POST, "/api/v1/records", admin, delivery).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/records/{record_id}"),
        admin,
        json!({"returnDate": "2026-03-01", "returnCondition": "Good"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Returned");

    let (_, device) = get(&app, "/api/v1/devices/555").await;
    assert_eq!(device["data"]["status"], "Available");

    // the returned record still references the employee
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/employees/{employee_id}"),
        admin,
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_failed_audit_write_keeps_mutation(pool: PgPool) -> TestResult {
    let admin = seed_admin(&pool).await?;
    let dir = tempfile::tempdir()?;
    let mut config = Config::default();
    config.uploads.dir = dir.path().to_path_buf();
    let mut state = FeatureState::new(pool.clone(), &config);
    state.recorder = AuditRecorder::new(Arc::new(FailingSink));
    let app = server::create_app(state, &config);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/devices",
        admin,
        json!({"model": "Moto E", "imei1": "3529990000042", "condition": "New"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["imei1"], "3529990000042");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices WHERE imei1 = $1")
        .bind("3529990000042")
        .fetch_one(&pool)
        .await?;
    assert_eq!(stored, 1);

    let audited: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
        .fetch_one(&pool)
        .await?;
    assert_eq!(audited, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_maintenance_numbering_and_condition(pool: PgPool) -> TestResult {
    let admin = seed_admin(&pool).await?;
    let dir = tempfile::tempdir()?;
    let app = router(pool.clone(), dir.path());

    send(
        &app,
        Method::POST,
        "/api/v1/devices",
        admin,
        json!({"model": "Galaxy A15", "imei1": "777", "condition": "Defective"}),
    )
    .await;

    let (_, eligible) = get(&app, "/api/v1/devices/eligible-for-maintenance").await;
    assert_eq!(eligible["data"].as_array().unwrap().len(), 1);

    let order = json!({"deviceImei": "777", "sentDate": "2026-04-01", "reportedDefect": "No signal"});
    let (status, first) = send(&app, Method::POST, "/api/v1/maintenance", admin, order.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let year = Utc::now().year();
    assert_eq!(first["data"]["orderNumber"], format!("SO-{year}-00001"));

    let (_, device) = get(&app, "/api/v1/devices/777").await;
    assert_eq!(device["data"]["condition"], "In maintenance");

    let (_, second) = send(&app, Method::POST, "/api/v1/maintenance", admin, order).await;
    assert_eq!(second["data"]["orderNumber"], format!("SO-{year}-00002"));

    let id = first["data"]["id"].as_i64().unwrap();
    let (status, closed) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/maintenance/{id}"),
        admin,
        json!({"status": "Completed", "cost": 89.9, "postCondition": "Approved for use"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["data"]["status"], "Completed");
    assert_eq!(closed["data"]["cost"], 89.9);

    let (_, device) = get(&app, "/api/v1/devices/777").await;
    assert_eq!(device["data"]["condition"], "Approved for use");

    // a deleted order does not hand its number out again
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/maintenance/{id}"),
        admin,
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, third) = send(
        &app,
        Method::POST,
        "/api/v1/maintenance",
        admin,
        json!({"deviceImei": "777", "sentDate": "2026-05-02", "reportedDefect": "Battery drain"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(third["data"]["orderNumber"], format!("SO-{year}-00003"));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_new_line_term_retires_previous(pool: PgPool) -> TestResult {
    let admin = seed_admin(&pool).await?;
    let dir = tempfile::tempdir()?;
    let app = router(pool.clone(), dir.path());

    for registration in ["1001", "1002"] {
        send(
            &app,
            Method::POST,
            "/api/v1/employees",
            admin,
            json!({"registration": registration, "name": format!("Employee {registration}"), "position": "Sales"}),
        )
        .await;
    }
    let (_, line) = send(
        &app,
        Method::POST,
        "/api/v1/lines",
        admin,
        json!({"number": "+55 11 90000-0001", "carrier": "Vivo", "status": "Active"}),
    )
    .await;
    let line_id = line["data"]["id"].as_i64().unwrap();

    for registration in ["1001", "1002"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/line-records",
            admin,
            json!({"lineId": line_id, "employeeRegistration": registration, "deliveryDate": "2026-05-02"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let statuses: Vec<(String, String)> = sqlx::query_as(
        "SELECT e.registration, t.status FROM line_terms t \
         JOIN employees e ON e.id = t.employee_id ORDER BY t.id",
    )
    .fetch_all(&pool)
    .await?;
    assert_eq!(
        statuses,
        vec![
            ("1001".to_string(), "Inactive".to_string()),
            ("1002".to_string(), "Active".to_string()),
        ]
    );

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/line-records",
        admin,
        json!({"lineId": line_id, "employeeRegistration": "9999", "deliveryDate": "2026-05-02"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_user_management_and_login(pool: PgPool) -> TestResult {
    let admin = seed_admin(&pool).await?;
    let dir = tempfile::tempdir()?;
    let app = router(pool.clone(), dir.path());

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        admin,
        json!({
            "name": "Rui",
            "username": "rui",
            "password": "s3cret",
            "role": "technician",
            "permissions": {"devices_create": true},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["data"].get("passwordHash").is_none());
    let rui = created["data"]["id"].as_i64().unwrap();

    let login = |password: &'static str| {
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({"username": "rui", "password": password}),
        )
    };
    let ok = app.clone().oneshot(login("s3cret")).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let profile = body_json(ok).await;
    assert_eq!(profile["data"]["permissions"], json!({"devices_create": true}));

    let wrong = app.clone().oneshot(login("guess")).await.unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    // the new principal is resolved on its very next request
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/v1/devices/123",
        rui,
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        admin,
        json!({"name": "Dup", "username": "rui", "password": "x", "role": "technician"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}
