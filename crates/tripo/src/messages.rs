//! Tripo request/response bodies and the values threaded between calls.
//!
//! Every Tripo response wraps its payload as `{"code": 0, "data": {...}}`.
//! Upload and submission responses are decoded into typed structs; poll
//! responses are kept verbatim in [`TaskResult`] so callers receive the
//! exact payload the service produced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Task type requested from the generation endpoint.
pub const TASK_TYPE_IMAGE_TO_MODEL: &str = "image_to_model";

/// File type declared for uploaded images.
pub const FILE_TYPE_PNG: &str = "png";

/// Content type declared for the multipart upload part.
pub const UPLOAD_CONTENT_TYPE: &str = "image/png";

/// Multipart field name the upload endpoint reads.
pub const UPLOAD_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque identifier of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetToken(String);

impl AssetToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AssetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL of a submitted task, polled for its status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle(String);

impl TaskHandle {
    /// `<task_url>/<task_id>`, with no normalisation of either part.
    pub fn from_task_id(task_url: &str, task_id: &str) -> Self {
        Self(format!("{task_url}/{task_id}"))
    }

    /// Wrap an already-built handle URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

/// Outer `{"data": ...}` wrapper shared by all responses.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `data` of an upload response.
#[derive(Debug, Deserialize)]
pub struct UploadData {
    pub image_token: String,
}

/// `data` of a task submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitData {
    pub task_id: String,
}

/// Body of `POST <task_url>`.
#[derive(Debug, Serialize)]
pub struct ImageToModelRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub file: FileReference<'a>,
}

/// Reference to an uploaded file inside a task request.
#[derive(Debug, Serialize)]
pub struct FileReference<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub file_token: &'a str,
}

impl<'a> ImageToModelRequest<'a> {
    pub fn new(token: &'a AssetToken) -> Self {
        Self {
            kind: TASK_TYPE_IMAGE_TO_MODEL,
            file: FileReference {
                kind: FILE_TYPE_PNG,
                file_token: token.as_str(),
            },
        }
    }
}

/// Decode an upload response body into the asset token it carries.
pub fn parse_upload(body: &[u8]) -> Result<AssetToken, RequestError> {
    let envelope: Envelope<UploadData> = serde_json::from_slice(body)?;
    Ok(AssetToken(envelope.data.image_token))
}

/// Decode a submission response body into the task id it carries.
pub fn parse_submit(body: &[u8]) -> Result<String, RequestError> {
    let envelope: Envelope<SubmitData> = serde_json::from_slice(body)?;
    Ok(envelope.data.task_id)
}

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

/// Status reported by a task poll.
///
/// Only [`Success`](Self::Success) and [`Failed`](Self::Failed) are
/// terminal. Values this client does not know are treated as still in
/// progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Pending,
    Running,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }
}

/// One poll response, kept verbatim alongside its decoded status.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    status: TaskStatus,
    payload: serde_json::Value,
}

impl TaskResult {
    /// Decode the status out of a raw poll payload.
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, RequestError> {
        let status = payload
            .pointer("/data/status")
            .ok_or(RequestError::MissingField("data.status"))?;
        let status = TaskStatus::deserialize(status)?;
        Ok(Self { status, payload })
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Completion percentage, when the service reports one.
    pub fn progress(&self) -> Option<u64> {
        self.payload
            .pointer("/data/progress")
            .and_then(serde_json::Value::as_u64)
    }

    /// `data.result.pbr_model.url`, present on successful tasks.
    pub fn model_url(&self) -> Option<&str> {
        self.payload
            .pointer("/data/result/pbr_model/url")
            .and_then(serde_json::Value::as_str)
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn into_payload(self) -> serde_json::Value {
        self.payload
    }
}
