//! Explicit state record for one generation cycle.
//!
//! A [`JobState`] is created from the input photo and advanced one stage
//! at a time by [`apply`], a pure function from `(state, event)` to the
//! next state. Each pipeline stage produces exactly one [`JobEvent`];
//! events that arrive out of order are rejected rather than silently
//! overwriting earlier results.
//!
//! ```text
//! Created -> [Stylized ->] Uploaded -> Submitted -> Succeeded -> Downloaded [-> Converted]
//!                                              \-> Failed | TimedOut
//! ```

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::error::CoreError;
use crate::style::ArtStyle;
use crate::types::{JobId, Timestamp};

/// Lifecycle stage of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Created,
    Stylized,
    Uploaded,
    Submitted,
    Succeeded,
    Failed,
    TimedOut,
    Downloaded,
    Converted,
}

impl JobStage {
    /// Whether no further event can be applied in this stage.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStage::Failed | JobStage::TimedOut | JobStage::Converted
        )
    }
}

/// Outcome of one pipeline stage.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// The photo was described and an illustration saved locally.
    Stylized {
        description: String,
        illustration_path: PathBuf,
    },
    /// The image was accepted by the remote service.
    Uploaded { asset_token: String },
    /// The generation task was queued.
    Submitted { task_handle: String },
    /// The remote task reported success.
    Completed { result: serde_json::Value },
    /// The remote task reported failure.
    TaskFailed { result: serde_json::Value },
    /// The remote task did not finish within the polling budget.
    TimedOut { timeout_secs: u64 },
    /// The generated mesh was written locally.
    Downloaded { model_path: PathBuf },
    /// The mesh was exported as STL.
    Converted { stl_path: PathBuf },
    /// Any other stage error.
    Errored { message: String },
}

impl JobEvent {
    /// Short event name used in logs and transition errors.
    pub fn name(&self) -> &'static str {
        match self {
            JobEvent::Stylized { .. } => "stylized",
            JobEvent::Uploaded { .. } => "uploaded",
            JobEvent::Submitted { .. } => "submitted",
            JobEvent::Completed { .. } => "completed",
            JobEvent::TaskFailed { .. } => "task_failed",
            JobEvent::TimedOut { .. } => "timed_out",
            JobEvent::Downloaded { .. } => "downloaded",
            JobEvent::Converted { .. } => "converted",
            JobEvent::Errored { .. } => "errored",
        }
    }
}

/// Everything known about one generation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct JobState {
    pub id: JobId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub stage: JobStage,
    /// Photo supplied by the user.
    pub source_image: PathBuf,
    pub style: ArtStyle,
    /// Vision-model description of the photo.
    pub description: Option<String>,
    /// Locally saved illustration.
    pub illustration_path: Option<PathBuf>,
    pub asset_token: Option<String>,
    pub task_handle: Option<String>,
    /// Last terminal payload reported by the remote task.
    pub result: Option<serde_json::Value>,
    pub model_path: Option<PathBuf>,
    pub stl_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl JobState {
    /// Start a new job for a photo.
    pub fn new(source_image: impl Into<PathBuf>, style: ArtStyle) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            stage: JobStage::Created,
            source_image: source_image.into(),
            style,
            description: None,
            illustration_path: None,
            asset_token: None,
            task_handle: None,
            result: None,
            model_path: None,
            stl_path: None,
            error: None,
        }
    }

    /// Image that should be sent to the mesh service: the illustration if
    /// one was generated, the original photo otherwise.
    pub fn upload_source(&self) -> &Path {
        self.illustration_path
            .as_deref()
            .unwrap_or(self.source_image.as_path())
    }

    /// Method form of [`apply`].
    pub fn apply(self, event: JobEvent) -> Result<JobState, CoreError> {
        apply(self, event)
    }
}

/// Advance `state` by one event.
///
/// Returns [`CoreError::InvalidTransition`] when the event is not valid in
/// the current stage; the input state is consumed either way, so callers
/// that need it after a rejected event should clone first.
pub fn apply(mut state: JobState, event: JobEvent) -> Result<JobState, CoreError> {
    let stage = state.stage;
    let next = match (stage, event) {
        (
            JobStage::Created,
            JobEvent::Stylized {
                description,
                illustration_path,
            },
        ) => {
            state.description = Some(description);
            state.illustration_path = Some(illustration_path);
            JobStage::Stylized
        }
        (JobStage::Created | JobStage::Stylized, JobEvent::Uploaded { asset_token }) => {
            state.asset_token = Some(asset_token);
            JobStage::Uploaded
        }
        (JobStage::Uploaded, JobEvent::Submitted { task_handle }) => {
            state.task_handle = Some(task_handle);
            JobStage::Submitted
        }
        (JobStage::Submitted, JobEvent::Completed { result }) => {
            state.result = Some(result);
            JobStage::Succeeded
        }
        (JobStage::Submitted, JobEvent::TaskFailed { result }) => {
            state.error = Some("Remote generation task failed".to_string());
            state.result = Some(result);
            JobStage::Failed
        }
        (JobStage::Submitted, JobEvent::TimedOut { timeout_secs }) => {
            state.error = Some(format!(
                "Remote generation task did not finish within {timeout_secs} seconds"
            ));
            JobStage::TimedOut
        }
        (JobStage::Succeeded, JobEvent::Downloaded { model_path }) => {
            state.model_path = Some(model_path);
            JobStage::Downloaded
        }
        (JobStage::Downloaded, JobEvent::Converted { stl_path }) => {
            state.stl_path = Some(stl_path);
            JobStage::Converted
        }
        (stage, JobEvent::Errored { message }) if !stage.is_terminal() => {
            state.error = Some(message);
            JobStage::Failed
        }
        (stage, event) => {
            return Err(CoreError::InvalidTransition {
                stage,
                event: event.name(),
            })
        }
    };

    state.stage = next;
    state.updated_at = Utc::now();
    Ok(state)
}
