//! Immutable connection settings for the Tripo API.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use toon3d_core::naming::DEFAULT_MODEL_DIR;

use crate::poll::PollConfig;

/// Production image-upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://api.tripo3d.ai/v2/openapi/upload";

/// Production task endpoint.
pub const DEFAULT_TASK_URL: &str = "https://api.tripo3d.ai/v2/openapi/task";

/// HTTP timeout for a single request (uploads and mesh downloads included).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Credential, endpoints and local output settings.
///
/// Built once and never mutated; the API key is redacted from `Debug`
/// output so the config can be logged.
#[derive(Clone)]
pub struct TripoConfig {
    /// Bearer credential sent with every authenticated call.
    pub api_key: String,
    /// Image upload endpoint.
    pub upload_url: String,
    /// Task submission endpoint; task handles are `<task_url>/<task_id>`.
    pub task_url: String,
    /// Directory downloaded meshes are written to.
    pub download_dir: PathBuf,
    /// Polling budget used by [`TripoApi::await_completion`](crate::TripoApi::await_completion).
    pub poll: PollConfig,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl TripoConfig {
    /// Config with the given credential and endpoints and default local
    /// settings.
    pub fn new(
        api_key: impl Into<String>,
        upload_url: impl Into<String>,
        task_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            upload_url: upload_url.into(),
            task_url: task_url.into(),
            download_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            poll: PollConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Config against the production endpoints.
    pub fn production(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_UPLOAD_URL, DEFAULT_TASK_URL)
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}

impl fmt::Debug for TripoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TripoConfig")
            .field("api_key", &"<redacted>")
            .field("upload_url", &self.upload_url)
            .field("task_url", &self.task_url)
            .field("download_dir", &self.download_dir)
            .field("poll", &self.poll)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
