//! Integration tests for the HTTP host.
//!
//! Each test builds the router over temporary directories and drives it with
//! `oneshot`, so no socket is bound.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use panda_merge::data::merge::MergeOptions;
use panda_merge::server::{build_router, AppState};
use panda_merge::session::SessionStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over fresh directories, with a small body limit.
fn setup_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let public_dir = dir.path().join("public");
    std::fs::create_dir_all(&public_dir).unwrap();
    std::fs::write(public_dir.join("index.html"), "<h1>merge</h1>").unwrap();

    let state = AppState {
        options: MergeOptions::default(),
        generated_dir: dir.path().join("generated"),
        public_dir,
        sessions: SessionStore::open(dir.path().join("sessions")).unwrap(),
        max_body_bytes: 64 * 1024,
    };
    (build_router(state), dir)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

async fn body_json(body: Body) -> Value {
    serde_json::from_str(&body_text(body).await).expect("Should parse JSON")
}

// =============================================================================
// POST /merge
// =============================================================================

#[tokio::test]
async fn merge_returns_csv_download_and_stores_copy() {
    let (app, dir) = setup_app();
    let payload = json!({
        "files": [
            { "name": "s1.txt", "content": "10 1.0\n20 2.0" },
            { "name": "s2.txt", "content": "20 9.0\n30 3.0" }
        ],
        "name": "batch 7"
    });

    let response = app.oneshot(post_json("/merge", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"batch_7.csv\""
    );
    assert_eq!(headers["x-total-rows"], "4");

    let csv = body_text(response.into_body()).await;
    assert_eq!(csv, "key,s1,s2\n30,,3\n20,2,9\n10,1,\n");

    let stored = std::fs::read_to_string(dir.path().join("generated/batch_7.csv")).unwrap();
    assert_eq!(stored, csv);
}

#[tokio::test]
async fn merge_defaults_output_name() {
    let (app, dir) = setup_app();
    let response = app
        .oneshot(post_json("/merge", &json!({ "files": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response.into_body()).await, "key\n");
    assert!(dir.path().join("generated/merged.csv").exists());
}

#[tokio::test]
async fn merge_rejects_invalid_payloads() {
    let (app, dir) = setup_app();

    let bodies = [
        json!({ "files": "a.txt" }),
        json!({ "files": [{ "name": "a.txt" }] }),
        json!([1, 2, 3]),
    ];
    for body in &bodies {
        let response = app.clone().oneshot(post_json("/merge", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let err = body_json(response.into_body()).await;
        assert_eq!(err["error"]["code"], "BAD_REQUEST");
    }
    assert!(!dir.path().join("generated").exists());
}

#[tokio::test]
async fn merge_rejects_malformed_json() {
    let (app, _dir) = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/merge")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, _dir) = setup_app();
    let big = "1 2\n".repeat(32 * 1024);
    let payload = json!({ "files": [{ "name": "big.txt", "content": big }] });

    let response = app.oneshot(post_json("/merge", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_merges_with_same_name_store_one_complete_csv() {
    let (app, dir) = setup_app();
    let long = json!({
        "files": [{ "name": "s1.txt", "content": "10 1\n20 2\n30 3\n".repeat(200) }],
        "name": "shared"
    });
    let short = json!({
        "files": [{ "name": "s1.txt", "content": "5 5" }],
        "name": "shared"
    });

    for _ in 0..10 {
        let (a, b) = tokio::join!(
            app.clone().oneshot(post_json("/merge", &long)),
            app.clone().oneshot(post_json("/merge", &short)),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.status(), StatusCode::OK);
        assert_eq!(b.status(), StatusCode::OK);
        let a = body_text(a.into_body()).await;
        let b = body_text(b.into_body()).await;

        let stored = std::fs::read_to_string(dir.path().join("generated/shared.csv")).unwrap();
        assert!(stored == a || stored == b, "stored CSV is garbled: {stored:?}");
    }

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("generated"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

// =============================================================================
// GET /generated/:file
// =============================================================================

#[tokio::test]
async fn generated_file_can_be_downloaded_again() {
    let (app, _dir) = setup_app();
    let payload = json!({
        "files": [{ "name": "a.txt", "content": "1 2" }],
        "name": "again"
    });
    let response = app
        .clone()
        .oneshot(post_json("/merge", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/generated/again.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"again.csv\""
    );
    assert_eq!(body_text(response.into_body()).await, "key,a\n1,2\n");
}

#[tokio::test]
async fn generated_rejects_unknown_and_traversal_names() {
    let (app, dir) = setup_app();
    std::fs::write(dir.path().join("secret.csv"), "nope").unwrap();

    for uri in ["/generated/missing.csv", "/generated/..%2Fsecret.csv", "/generated/.."] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn session_round_trip() {
    let (app, _dir) = setup_app();
    let payload = json!({ "columns": ["s1", "s2"], "zoom": [400, 4000] });

    let response = app
        .clone()
        .oneshot(post_json("/api/sessions", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response.into_body()).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(created["created_at"].is_string());

    let response = app
        .oneshot(get(&format!("/api/sessions/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let record = body_json(response.into_body()).await;
    assert_eq!(record["id"], id.as_str());
    assert_eq!(record["payload"], payload);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let (app, _dir) = setup_app();
    let response = app
        .oneshot(get("/api/sessions/00000000-0000-4000-8000-000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err = body_json(response.into_body()).await;
    assert_eq!(err["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Health and static files
// =============================================================================

#[tokio::test]
async fn health_endpoint() {
    let (app, _dir) = setup_app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "panda-merge");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn static_files_are_served_from_public_dir() {
    let (app, _dir) = setup_app();
    let response = app.clone().oneshot(get("/index.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response.into_body()).await, "<h1>merge</h1>");

    let response = app.oneshot(get("/missing.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
