//! In-process stand-in for the Tripo API.
//!
//! Binds an axum router to `127.0.0.1:0` and records what the client sent
//! so tests can assert on headers, multipart parts and JSON bodies.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use toon3d_tripo::TripoConfig;

pub const API_KEY: &str = "test-key";
pub const IMAGE_TOKEN: &str = "img-token-1";
pub const TASK_ID: &str = "task-42";
pub const MODEL_BYTES: &[u8] = b"glTF\x02\x00\x00\x00fake-mesh-bytes";

/// One multipart part received by the upload route.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Everything the mock observed.
pub struct MockState {
    pub base_url: String,
    /// Statuses replayed by the poll route; the last one repeats.
    pub script: Vec<&'static str>,
    pub polls: AtomicUsize,
    pub downloads: AtomicUsize,
    pub parts: Mutex<Vec<ReceivedPart>>,
    pub submissions: Mutex<Vec<Value>>,
    pub download_auth: Mutex<Vec<Option<String>>>,
}

pub struct MockTripo {
    pub state: Arc<MockState>,
}

impl MockTripo {
    pub async fn start(script: Vec<&'static str>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(MockState {
            base_url,
            script,
            polls: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            parts: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            download_auth: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/upload", post(upload))
            .route("/upload-empty", post(upload_empty))
            .route("/task", post(submit))
            .route("/task/{id}", get(poll))
            .route("/broken/{id}", get(broken))
            .route("/files/model.glb", get(model_file))
            .route("/files/missing.glb", get(missing_file))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.state.base_url)
    }

    /// Client config pointed at this mock.
    pub fn config(&self) -> TripoConfig {
        TripoConfig::new(API_KEY, self.url("/upload"), self.url("/task"))
    }

    pub fn polls(&self) -> usize {
        self.state.polls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.state.downloads.load(Ordering::SeqCst)
    }

    pub fn model_url(&self) -> String {
        self.url("/files/model.glb")
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {API_KEY}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"code": 1002, "message": "invalid api key"})),
    )
        .into_response()
}

async fn upload(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap().to_vec();
        state.parts.lock().unwrap().push(ReceivedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    Json(json!({"code": 0, "data": {"image_token": IMAGE_TOKEN}})).into_response()
}

async fn upload_empty() -> Json<Value> {
    Json(json!({"code": 2002, "data": {}}))
}

async fn submit(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.submissions.lock().unwrap().push(body);
    Json(json!({"code": 0, "data": {"task_id": TASK_ID}})).into_response()
}

async fn poll(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let n = state.polls.fetch_add(1, Ordering::SeqCst);
    let status = state.script[n.min(state.script.len() - 1)];

    let mut data = json!({"task_id": id, "type": "image_to_model", "status": status});
    if status == "success" {
        data["progress"] = json!(100);
        data["result"] = json!({
            "pbr_model": {
                "type": "glb",
                "url": format!("{}/files/model.glb", state.base_url),
            }
        });
    } else {
        data["progress"] = json!(n * 10);
    }
    Json(json!({"code": 0, "data": data})).into_response()
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn model_file(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Vec<u8> {
    state.downloads.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.download_auth.lock().unwrap().push(auth);
    MODEL_BYTES.to_vec()
}

async fn missing_file(State(state): State<Arc<MockState>>) -> Response {
    state.downloads.fetch_add(1, Ordering::SeqCst);
    (StatusCode::NOT_FOUND, "no such object").into_response()
}
