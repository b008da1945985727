//! Error types for the Tripo client.

use std::path::PathBuf;

/// Failure of a single HTTP exchange with the remote service.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The local file to upload could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status code.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required field was absent from an otherwise valid response.
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

/// Errors surfaced by the job lifecycle operations.
///
/// Nothing is retried; each variant is returned to the caller as soon as
/// it is observed.
#[derive(Debug, thiserror::Error)]
pub enum TripoError {
    /// Uploading the image failed.
    #[error("image upload failed: {0}")]
    Upload(#[source] RequestError),

    /// Submitting the generation task failed.
    #[error("task submission failed: {0}")]
    Submission(#[source] RequestError),

    /// A status poll failed before the task reached a terminal status.
    #[error("task status poll failed: {0}")]
    Poll(#[source] RequestError),

    /// The remote task reported `failed`. Carries the full payload.
    #[error("generation task failed: {payload}")]
    TaskFailed { payload: serde_json::Value },

    /// No terminal status was observed within the polling budget.
    #[error("generation task did not finish within {timeout_secs} seconds ({polls} polls)")]
    Timeout { timeout_secs: u64, polls: u32 },

    /// A success payload lacked the expected nested fields.
    #[error("task result is missing `{0}`")]
    MalformedResult(&'static str),

    /// Fetching the generated mesh failed.
    #[error("model download failed: {0}")]
    Download(#[source] RequestError),

    /// Writing the downloaded mesh failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
