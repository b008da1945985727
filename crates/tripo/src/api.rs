//! REST client for the Tripo image-to-3D endpoints.
//!
//! Wraps image upload, task submission, task polling and result download
//! using [`reqwest`]. Each call is independent: the client holds only the
//! immutable [`TripoConfig`] and a pooled HTTP client.

use std::path::{Path, PathBuf};

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use toon3d_core::naming::upload_file_name;

use crate::config::TripoConfig;
use crate::download;
use crate::error::{RequestError, TripoError};
use crate::messages::{
    parse_submit, parse_upload, AssetToken, ImageToModelRequest, TaskHandle, TaskResult,
    UPLOAD_CONTENT_TYPE, UPLOAD_FIELD,
};
use crate::poll::{poll_until_terminal, PollConfig};

/// HTTP client for one Tripo account.
pub struct TripoApi {
    client: reqwest::Client,
    config: TripoConfig,
}

impl TripoApi {
    /// Create a client with its own connection pool and the configured
    /// request timeout.
    pub fn new(config: TripoConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: TripoConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &TripoConfig {
        &self.config
    }

    /// Upload a local image and return the asset token assigned to it.
    ///
    /// The file is sent as multipart field `file`, named after the path's
    /// basename and declared as `image/png`.
    pub async fn upload_image(&self, path: &Path) -> Result<AssetToken, TripoError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            TripoError::Upload(RequestError::ReadFile {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let size = bytes.len();

        let part = Part::bytes(bytes)
            .file_name(upload_file_name(path))
            .mime_str(UPLOAD_CONTENT_TYPE)
            .map_err(|e| TripoError::Upload(e.into()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let token = self
            .send_authorized(self.client.post(&self.config.upload_url).multipart(form))
            .await
            .and_then(|body| parse_upload(&body))
            .map_err(TripoError::Upload)?;

        tracing::info!(path = %path.display(), size, "Image uploaded");
        Ok(token)
    }

    /// Submit an `image_to_model` task for an uploaded image.
    ///
    /// Returns the task handle `<task_url>/<task_id>`.
    pub async fn submit_image_to_model(
        &self,
        token: &AssetToken,
    ) -> Result<TaskHandle, TripoError> {
        let request = self
            .client
            .post(&self.config.task_url)
            .json(&ImageToModelRequest::new(token));

        let task_id = self
            .send_authorized(request)
            .await
            .and_then(|body| parse_submit(&body))
            .map_err(TripoError::Submission)?;

        let handle = TaskHandle::from_task_id(&self.config.task_url, &task_id);
        tracing::info!(task_id = %task_id, task_handle = %handle, "Task submitted");
        Ok(handle)
    }

    /// Fetch the current state of a task once.
    pub async fn fetch_task(&self, handle: &TaskHandle) -> Result<TaskResult, TripoError> {
        self.send_authorized(self.client.get(handle.as_str()))
            .await
            .and_then(|body| Ok(serde_json::from_slice::<serde_json::Value>(&body)?))
            .and_then(TaskResult::from_payload)
            .map_err(TripoError::Poll)
    }

    /// Poll a task with the configured budget until it succeeds, fails or
    /// times out.
    pub async fn await_completion(&self, handle: &TaskHandle) -> Result<TaskResult, TripoError> {
        self.await_completion_with(handle, &self.config.poll).await
    }

    /// [`await_completion`](Self::await_completion) with an explicit budget.
    pub async fn await_completion_with(
        &self,
        handle: &TaskHandle,
        poll: &PollConfig,
    ) -> Result<TaskResult, TripoError> {
        tracing::info!(
            task_handle = %handle,
            timeout_secs = poll.timeout.as_secs(),
            interval_ms = poll.interval.as_millis() as u64,
            "Waiting for task",
        );
        poll_until_terminal(poll, move || self.fetch_task(handle)).await
    }

    /// Download the mesh of a successful task into the configured
    /// directory and return the written path.
    pub async fn download_model(&self, result: &TaskResult) -> Result<PathBuf, TripoError> {
        download::download_model(&self.client, result, &self.config.download_dir).await
    }

    // ---- private helpers ----

    /// Attach the bearer credential, send, and return the body of a
    /// successful response.
    async fn send_authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, RequestError> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or a [`RequestError::Status`] containing the
/// status and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, RequestError> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(response).await);
    }
    Ok(response)
}

/// Consume a rejected response into a [`RequestError::Status`].
pub(crate) async fn status_error(response: reqwest::Response) -> RequestError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    RequestError::Status { status, body }
}
