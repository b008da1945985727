//! One in-process server standing in for both remote services: the Tripo
//! task API and the two OpenAI endpoints the stylizer calls.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};

use toon3d_core::style::ArtStyle;
use toon3d_stylize::{OpenAiApi, OpenAiConfig, Stylizer};
use toon3d_tripo::{PollConfig, TripoApi, TripoConfig};
use toon3d_worker::pipeline::Pipeline;

pub const TRIPO_KEY: &str = "tripo-key";
pub const OPENAI_KEY: &str = "sk-test";
pub const DESCRIPTION: &str = "A child holding a red kite on a beach.";

pub struct MockState {
    pub base_url: String,
    /// Statuses replayed by the poll route; the last one repeats.
    pub script: Vec<&'static str>,
    /// Body served as the generated model.
    pub model: Vec<u8>,
    pub polls: AtomicUsize,
    /// Bytes of every uploaded file part.
    pub uploads: Mutex<Vec<Vec<u8>>>,
    pub prompts: Mutex<Vec<String>>,
}

pub struct MockServices {
    pub state: Arc<MockState>,
}

impl MockServices {
    pub async fn start(script: Vec<&'static str>, model: Vec<u8>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(MockState {
            base_url,
            script,
            model,
            polls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/tripo/upload", post(upload))
            .route("/tripo/task", post(submit))
            .route("/tripo/task/{id}", get(poll))
            .route("/files/model.glb", get(model_file))
            .route("/v1/chat/completions", post(chat))
            .route("/v1/images/generations", post(generate))
            .route("/hosted/illustration.png", get(illustration))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.state.base_url)
    }

    /// Tripo client writing models into `dir`, polling every 20ms for at
    /// most `timeout`.
    pub fn tripo(&self, dir: &Path, timeout: Duration) -> TripoApi {
        let config = TripoConfig::new(TRIPO_KEY, self.url("/tripo/upload"), self.url("/tripo/task"))
            .with_download_dir(dir)
            .with_poll(PollConfig {
                timeout,
                interval: Duration::from_millis(20),
            });
        TripoApi::new(config).unwrap()
    }

    pub fn stylizer(&self, dir: &Path) -> Stylizer {
        let config = OpenAiConfig::new(OPENAI_KEY)
            .with_base_url(self.url("/v1"))
            .with_output_dir(dir);
        Stylizer::new(OpenAiApi::new(config).unwrap())
    }

    /// Pipeline that skips stylization.
    pub fn direct_pipeline(&self, dir: &Path, export_stl: bool) -> Pipeline {
        Pipeline::new(
            self.tripo(dir, Duration::from_secs(5)),
            None,
            ArtStyle::default(),
            export_stl,
        )
    }

    pub fn polls(&self) -> usize {
        self.state.polls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.state.uploads.lock().unwrap().clone()
    }
}

/// A small RGB PNG standing in for a user photo.
pub fn photo_png() -> Vec<u8> {
    encode_png(RgbImage::from_pixel(4, 4, Rgb([200, 120, 40])))
}

/// What the image model "generates".
pub fn illustration_png() -> Vec<u8> {
    encode_png(RgbImage::from_pixel(2, 2, Rgb([10, 20, 30])))
}

fn encode_png(img: RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// A GLB holding a single triangle in the XY plane.
pub fn triangle_glb() -> Vec<u8> {
    let bin: Vec<u8> = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let doc = json!({
        "asset": {"version": "2.0"},
        "scenes": [{"nodes": [0]}],
        "nodes": [{"mesh": 0}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
        "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}],
        "bufferViews": [{"buffer": 0, "byteLength": 36}],
        "buffers": [{"byteLength": 36}]
    });

    let mut json = serde_json::to_vec(&doc).unwrap();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

async fn upload(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let bytes = field.bytes().await.unwrap().to_vec();
        state.uploads.lock().unwrap().push(bytes);
    }
    Json(json!({"code": 0, "data": {"image_token": "img-token"}}))
}

async fn submit() -> Json<Value> {
    Json(json!({"code": 0, "data": {"task_id": "task-7"}}))
}

async fn poll(State(state): State<Arc<MockState>>) -> Json<Value> {
    let n = state.polls.fetch_add(1, Ordering::SeqCst);
    let status = state.script[n.min(state.script.len() - 1)];

    let mut data = json!({"task_id": "task-7", "status": status});
    if status == "success" {
        data["result"] = json!({
            "pbr_model": {"url": format!("{}/files/model.glb", state.base_url)}
        });
    }
    Json(json!({"code": 0, "data": data}))
}

async fn model_file(State(state): State<Arc<MockState>>) -> Vec<u8> {
    state.model.clone()
}

async fn chat() -> Json<Value> {
    Json(json!({
        "choices": [{"message": {"role": "assistant", "content": DESCRIPTION}}]
    }))
}

async fn generate(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
    state.prompts.lock().unwrap().push(prompt);
    Json(json!({
        "data": [{"url": format!("{}/hosted/illustration.png", state.base_url)}]
    }))
}

async fn illustration() -> Response {
    (
        [(axum::http::header::CONTENT_TYPE, "image/png")],
        illustration_png(),
    )
        .into_response()
}
