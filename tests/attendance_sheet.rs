use attendanced::db;
use attendanced::http::{router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn fresh_app(prefix: &str) -> Router {
    let workspace = temp_dir(prefix);
    let conn = db::open_db(&workspace).expect("open db");
    router(AppState::new(conn, Some(db::db_path(&workspace))))
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("build request"))
        .await
        .expect("call router");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse response json")
    };
    (status, value)
}

async fn request_ok(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> serde_json::Value {
    let (status, value) = request(app, method, uri, body).await;
    assert!(
        status.is_success(),
        "{} {} failed: {} {}",
        method,
        uri,
        status,
        value
    );
    value
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

async fn create_batch(app: &Router, name: &str) -> String {
    let created = request_ok(app, "POST", "/batches", Some(json!({ "name": name }))).await;
    created
        .get("_id")
        .and_then(|v| v.as_str())
        .expect("batch _id")
        .to_string()
}

async fn create_student(app: &Router, batch: &str, name: &str, roll: &str) -> String {
    let created = request_ok(
        app,
        "POST",
        "/students",
        Some(json!({ "name": name, "rollNumber": roll, "batch": batch })),
    )
    .await;
    created
        .get("_id")
        .and_then(|v| v.as_str())
        .expect("student _id")
        .to_string()
}

#[tokio::test]
async fn sheet_lists_every_roster_member_with_unset_status() {
    let app = fresh_app("attendance-sheet-unset");
    let batch = create_batch(&app, "A").await;
    let s10 = create_student(&app, &batch, "Ten", "10").await;
    let s2 = create_student(&app, &batch, "Two", "2").await;

    let rows = request_ok(&app, "GET", &format!("/attendance?batch={}&date=2024-03-01", batch), None).await;
    let rows = rows.as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].get("student").and_then(|s| s.get("_id")).and_then(|v| v.as_str()),
        Some(s2.as_str())
    );
    assert_eq!(
        rows[0].get("student").and_then(|s| s.get("rollNumber")).and_then(|v| v.as_str()),
        Some("2")
    );
    assert!(rows.iter().all(|r| r.get("status").map(|v| v.is_null()) == Some(true)));

    let _ = request_ok(
        &app,
        "POST",
        "/attendance/bulk",
        Some(json!({
            "batch": batch,
            "date": "2024-03-01",
            "records": [{ "student": s10, "status": "ABSENT", "remarks": "sick" }]
        })),
    )
    .await;

    let rows = request_ok(&app, "GET", &format!("/attendance?batch={}&date=2024-03-01", batch), None).await;
    let rows = rows.as_array().expect("rows");
    assert!(rows[0].get("status").expect("status").is_null());
    assert_eq!(rows[1].get("status").and_then(|v| v.as_str()), Some("ABSENT"));
    assert_eq!(rows[1].get("remarks").and_then(|v| v.as_str()), Some("sick"));

    // Other dates stay unset.
    let other = request_ok(&app, "GET", &format!("/attendance?batch={}&date=2024-03-02", batch), None).await;
    assert!(other
        .as_array()
        .expect("rows")
        .iter()
        .all(|r| r.get("status").map(|v| v.is_null()) == Some(true)));
}

#[tokio::test]
async fn sheet_requires_known_batch_and_valid_date() {
    let app = fresh_app("attendance-sheet-validation");
    let batch = create_batch(&app, "A").await;

    let (status, body) = request(&app, "GET", "/attendance?batch=missing-batch&date=2024-03-01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");

    let (status, body) = request(&app, "GET", &format!("/attendance?batch={}", batch), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_argument");

    let (status, body) = request(&app, "GET", &format!("/attendance?batch={}&date=01-03-2024", batch), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_argument");

    for loose in ["2024-3-1", "%202024-03-01", "%2B2024-03-01"] {
        let uri = format!("/attendance?batch={}&date={}", batch, loose);
        let (status, body) = request(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", loose);
        assert_eq!(error_code(&body), "invalid_argument");
    }
}
