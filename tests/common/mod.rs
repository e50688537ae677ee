//! Shared fixtures for integration tests: a local axum server standing in
//! for the screening backend, and session/file helpers.

#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use camino::Utf8PathBuf;
use resume_screener::services::HttpScreeningApi;
use resume_screener::{Metrics, ScreenerConfig, ScreeningSession, StateManager};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const JOB_DESCRIPTION: &str = "Senior Python developer with machine learning experience";

/// How the fake backend answers
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Healthy probe, analysis JSON on upload
    Success,
    /// Respond to both endpoints with this status
    Status(u16),
    /// 200 with a body that isn't JSON
    NotJson,
    /// Wait before answering successfully
    Slow(Duration),
}

/// What the fake backend saw in one upload
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub file_len: usize,
    pub job_description: Option<String>,
}

struct BackendState {
    behavior: Behavior,
    uploads: Mutex<Vec<ReceivedUpload>>,
    health_checks: Mutex<usize>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<BackendState>,
    server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn health_checks(&self) -> usize {
        *self.state.health_checks.lock().unwrap()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub fn analysis_json() -> serde_json::Value {
    json!({
        "match_score": 82.4,
        "skill_match_score": 75.0,
        "matched_skills": ["Python", "ML"],
        "prediction": "Suitable",
        "bert_classification": { "label": "Relevant", "score": 0.91 },
        "file_saved_at": "uploads/resume.pdf"
    })
}

pub async fn spawn_backend(behavior: Behavior) -> MockBackend {
    let state = Arc::new(BackendState {
        behavior,
        uploads: Mutex::new(Vec::new()),
        health_checks: Mutex::new(0),
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/upload_resume/", post(upload_resume))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        base_url: format!("http://{}", addr),
        state,
        server,
    }
}

/// A base URL nothing is listening on
pub async fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn health(State(state): State<Arc<BackendState>>) -> Response {
    *state.health_checks.lock().unwrap() += 1;
    match state.behavior {
        Behavior::Success => Json(json!({ "status": "healthy" })).into_response(),
        Behavior::Status(code) => status_response(code),
        Behavior::NotJson => (StatusCode::OK, "<html>ok</html>").into_response(),
        Behavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            Json(json!({ "status": "healthy" })).into_response()
        }
    }
}

async fn upload_resume(State(state): State<Arc<BackendState>>, mut multipart: Multipart) -> Response {
    let mut received = ReceivedUpload::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "file" => {
                received.file_name = field.file_name().map(str::to_string);
                received.content_type = field.content_type().map(str::to_string);
                received.file_len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            "job_description" => {
                received.job_description = field.text().await.ok();
            }
            _ => {}
        }
    }
    state.uploads.lock().unwrap().push(received);

    match state.behavior {
        Behavior::Success => Json(analysis_json()).into_response(),
        Behavior::Status(code) => status_response(code),
        Behavior::NotJson => (StatusCode::OK, "<html>Internal proxy page</html>").into_response(),
        Behavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            Json(analysis_json()).into_response()
        }
    }
}

fn status_response(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "detail": "mock failure" }))).into_response()
}

pub fn config_for(base_url: &str) -> ScreenerConfig {
    ScreenerConfig {
        api_url: Some(base_url.to_string()),
        health_timeout_secs: 1,
        upload_timeout_secs: 5,
        phase_tick_ms: 10,
        ..Default::default()
    }
}

pub struct TestSession {
    pub session: Arc<ScreeningSession>,
    pub state: Arc<StateManager>,
    pub metrics: Arc<Metrics>,
}

pub fn session_with_config(config: &ScreenerConfig) -> TestSession {
    let state = Arc::new(StateManager::new());
    let metrics = Arc::new(Metrics::new());
    let api = Arc::new(HttpScreeningApi::new(config).unwrap());
    let session = Arc::new(ScreeningSession::new(
        state.clone(),
        api,
        metrics.clone(),
        config,
    ));
    TestSession {
        session,
        state,
        metrics,
    }
}

pub fn session_for(base_url: &str) -> TestSession {
    session_with_config(&config_for(base_url))
}

/// Write a fake resume of `size` bytes into `dir`
pub fn write_resume(dir: &TempDir, name: &str, size: usize) -> Utf8PathBuf {
    let path = dir.path().join(name);
    let contents: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, contents).unwrap();
    Utf8PathBuf::from_path_buf(path).unwrap()
}
