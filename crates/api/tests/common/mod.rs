#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use cirelay_api::config::ServerConfig;
use cirelay_api::ingest::IngestMode;
use cirelay_api::router::build_app_router;
use cirelay_api::state::AppState;
use cirelay_db::FileEventStore;

/// Build a test `ServerConfig` pointing at `events_file`.
pub fn test_config(events_file: &Path, ingest_mode: IngestMode) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        events_file: events_file.to_path_buf(),
        ingest_mode,
        forward_url: None,
        forward_timeout_secs: 2,
        slack_webhook_url: None,
    }
}

/// Build application state backed by a file store at `config.events_file`.
pub fn test_state(config: &ServerConfig) -> AppState {
    let store = Arc::new(FileEventStore::new(&config.events_file));
    AppState::new(config.clone(), store).expect("state should build")
}

/// Build the full application router (same middleware stack as production).
pub fn build_test_app(state: AppState, config: &ServerConfig) -> Router {
    build_app_router(state, config)
}

/// Wait for every deferred append spawned so far.
pub async fn drain(state: &AppState) {
    state.tasks.close();
    state.tasks.wait().await;
    state.tasks.reopen();
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a raw webhook body with an optional `X-GitHub-Event` header.
pub async fn post_webhook(app: Router, body: &str, event_type: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/webhook/github")
        .header("content-type", "application/json");
    if let Some(event_type) = event_type {
        builder = builder.header("X-GitHub-Event", event_type);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// A `workflow_run` webhook payload.
pub fn workflow_run_payload(
    name: &str,
    status: &str,
    conclusion: Option<&str>,
    updated_at: &str,
) -> String {
    serde_json::json!({
        "action": if status == "completed" { "completed" } else { "requested" },
        "workflow_run": {
            "id": 1,
            "name": name,
            "status": status,
            "conclusion": conclusion,
            "run_number": 42,
            "updated_at": updated_at,
            "html_url": format!("https://github.com/octo-org/octo-repo/actions/runs/{name}")
        },
        "repository": { "full_name": "octo-org/octo-repo" },
        "sender": { "login": "octocat" }
    })
    .to_string()
}
