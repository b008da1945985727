//! In-process stand-in for the OpenAI endpoints used by the stylizer.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};

pub const API_KEY: &str = "sk-test";
pub const DESCRIPTION: &str = "A person with short black hair and a green scarf.";
pub const ILLUSTRATION_BYTES: &[u8] = b"\x89PNG\r\n\x1a\ngenerated-illustration";

/// Canned behaviour for one mock instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Behaviour {
    pub empty_description: bool,
    pub reject_generation: bool,
}

pub struct MockState {
    pub base_url: String,
    pub behaviour: Behaviour,
    pub chat_requests: Mutex<Vec<Value>>,
    pub image_requests: Mutex<Vec<Value>>,
    pub auth_headers: Mutex<Vec<Option<String>>>,
}

pub struct MockOpenAi {
    pub state: Arc<MockState>,
}

impl MockOpenAi {
    pub async fn start(behaviour: Behaviour) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(MockState {
            base_url,
            behaviour,
            chat_requests: Mutex::new(Vec::new()),
            image_requests: Mutex::new(Vec::new()),
            auth_headers: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(chat))
            .route("/v1/images/generations", post(generate))
            .route("/hosted/out.png", get(hosted_image))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state }
    }

    pub fn base_url(&self) -> String {
        format!("{}/v1", self.state.base_url)
    }

    pub fn hosted_url(&self) -> String {
        format!("{}/hosted/out.png", self.state.base_url)
    }

    pub fn request_count(&self) -> usize {
        self.state.chat_requests.lock().unwrap().len()
            + self.state.image_requests.lock().unwrap().len()
    }
}

/// A small opaque RGB PNG standing in for a user photo.
pub fn photo_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, Rgb([200, 150, 100]));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

fn record_auth(state: &MockState, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.auth_headers.lock().unwrap().push(auth);
}

async fn chat(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_auth(&state, &headers);
    state.chat_requests.lock().unwrap().push(body);
    let content = if state.behaviour.empty_description {
        Value::Null
    } else {
        json!(DESCRIPTION)
    };
    Json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    }))
}

async fn generate(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_auth(&state, &headers);
    state.image_requests.lock().unwrap().push(body);
    if state.behaviour.reject_generation {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "content policy violation"}})),
        )
            .into_response();
    }
    Json(json!({
        "created": 1,
        "data": [{"url": format!("{}/hosted/out.png", state.base_url)}]
    }))
    .into_response()
}

async fn hosted_image(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Vec<u8> {
    record_auth(&state, &headers);
    ILLUSTRATION_BYTES.to_vec()
}
