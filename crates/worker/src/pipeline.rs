//! Runs one photo through the full generation cycle.
//!
//! [`Pipeline::run`] is a small state machine driver: it asks
//! [`Pipeline::next_event`] for the outcome of whichever stage the
//! [`JobState`] is in, folds that event in with [`apply`], and repeats
//! until nothing is left to do. Any stage error is recorded on the state
//! as a failure and returned together with it.

use std::path::PathBuf;

use toon3d_core::error::CoreError;
use toon3d_core::job::{apply, JobEvent, JobStage, JobState};
use toon3d_core::style::ArtStyle;
use toon3d_mesh::MeshError;
use toon3d_stylize::{OpenAiApi, StylizeError, Stylizer};
use toon3d_tripo::{AssetToken, TaskHandle, TaskResult, TripoApi, TripoError};

use crate::config::WorkerConfig;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Stylization failed: {0}")]
    Stylize(#[from] StylizeError),

    #[error(transparent)]
    Tripo(#[from] TripoError),

    #[error("STL export failed: {0}")]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("STL export task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A job that stopped before finishing, with the state it stopped in.
#[derive(Debug, thiserror::Error)]
#[error("Job {} failed in stage {:?}: {source}", .state.id, .failed_in)]
pub struct JobFailure {
    /// Stage the job was in when the error occurred.
    pub failed_in: JobStage,
    /// State after the failure was recorded.
    pub state: Box<JobState>,
    #[source]
    pub source: PipelineError,
}

pub struct Pipeline {
    tripo: TripoApi,
    stylizer: Option<Stylizer>,
    style: ArtStyle,
    export_stl: bool,
}

impl Pipeline {
    pub fn new(
        tripo: TripoApi,
        stylizer: Option<Stylizer>,
        style: ArtStyle,
        export_stl: bool,
    ) -> Self {
        Self {
            tripo,
            stylizer,
            style,
            export_stl,
        }
    }

    /// Build the HTTP clients described by `config`.
    pub fn from_config(config: WorkerConfig) -> Result<Self, PipelineError> {
        let tripo = TripoApi::new(config.tripo)?;
        let stylizer = match config.openai {
            Some(openai) => Some(Stylizer::new(OpenAiApi::new(openai)?)),
            None => None,
        };
        Ok(Self::new(tripo, stylizer, config.style, config.export_stl))
    }

    /// Run one generation cycle for the photo at `source`.
    ///
    /// On success the returned state is `Downloaded`, or `Converted` when
    /// STL export is enabled.
    pub async fn run(&self, source: impl Into<PathBuf>) -> Result<JobState, JobFailure> {
        let mut state = JobState::new(source, self.style);
        tracing::info!(
            job_id = %state.id,
            source = %state.source_image.display(),
            style = %state.style,
            stylize = self.stylizer.is_some(),
            "Job started",
        );

        loop {
            let event = match self.next_event(&state).await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(err) => return Err(fail(state, err)),
            };

            let from = state.stage;
            let name = event.name();
            state = match apply(state.clone(), event) {
                Ok(next) => next,
                Err(err) => return Err(fail(state, err.into())),
            };
            tracing::info!(
                job_id = %state.id,
                event = name,
                ?from,
                to = ?state.stage,
                "Job advanced",
            );
        }

        tracing::info!(
            job_id = %state.id,
            stage = ?state.stage,
            model = ?state.model_path,
            stl = ?state.stl_path,
            "Job finished",
        );
        Ok(state)
    }

    /// Perform the work of the stage `state` is in and report its outcome.
    /// Returns `None` once there is nothing left to do.
    async fn next_event(&self, state: &JobState) -> Result<Option<JobEvent>, PipelineError> {
        let event = match state.stage {
            JobStage::Created => match &self.stylizer {
                Some(stylizer) => {
                    let illustration = stylizer.stylize(&state.source_image, state.style).await?;
                    JobEvent::Stylized {
                        description: illustration.description,
                        illustration_path: illustration.path,
                    }
                }
                None => self.upload(state).await?,
            },
            JobStage::Stylized => self.upload(state).await?,
            JobStage::Uploaded => {
                let token = AssetToken::new(required(&state.asset_token, "asset token")?);
                let handle = self.tripo.submit_image_to_model(&token).await?;
                JobEvent::Submitted {
                    task_handle: handle.into_inner(),
                }
            }
            JobStage::Submitted => {
                let handle = TaskHandle::from_url(required(&state.task_handle, "task handle")?);
                JobEvent::Completed {
                    result: self.tripo.await_completion(&handle).await?.into_payload(),
                }
            }
            JobStage::Succeeded => {
                let payload = required(&state.result, "task result")?;
                let result = TaskResult::from_payload(payload).map_err(TripoError::Poll)?;
                JobEvent::Downloaded {
                    model_path: self.tripo.download_model(&result).await?,
                }
            }
            JobStage::Downloaded if self.export_stl => {
                let model_path = required(&state.model_path, "model path")?;
                let stl_path =
                    tokio::task::spawn_blocking(move || toon3d_mesh::convert_file(&model_path))
                        .await??;
                JobEvent::Converted { stl_path }
            }
            JobStage::Downloaded
            | JobStage::Converted
            | JobStage::Failed
            | JobStage::TimedOut => return Ok(None),
        };
        Ok(Some(event))
    }

    async fn upload(&self, state: &JobState) -> Result<JobEvent, PipelineError> {
        let token = self.tripo.upload_image(state.upload_source()).await?;
        Ok(JobEvent::Uploaded {
            asset_token: token.into_inner(),
        })
    }
}

fn required<T: Clone>(value: &Option<T>, what: &str) -> Result<T, CoreError> {
    value
        .clone()
        .ok_or_else(|| CoreError::Internal(format!("{what} missing from job state")))
}

/// Record `err` on `state` and wrap both into a [`JobFailure`].
///
/// A remote failure or timeout is recorded with its own event so the
/// state keeps the task payload; every other error becomes `Errored`.
fn fail(state: JobState, err: PipelineError) -> JobFailure {
    let failed_in = state.stage;
    let event = match &err {
        PipelineError::Tripo(TripoError::TaskFailed { payload }) => JobEvent::TaskFailed {
            result: payload.clone(),
        },
        PipelineError::Tripo(TripoError::Timeout { timeout_secs, .. }) => JobEvent::TimedOut {
            timeout_secs: *timeout_secs,
        },
        other => JobEvent::Errored {
            message: other.to_string(),
        },
    };

    let state = match apply(state.clone(), event) {
        Ok(recorded) => recorded,
        Err(_) => state,
    };
    tracing::error!(
        job_id = %state.id,
        stage = ?failed_in,
        error = %err,
        "Job failed",
    );
    JobFailure {
        failed_in,
        state: Box::new(state),
        source: err,
    }
}
