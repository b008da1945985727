use crate::job::JobStage;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid job transition: cannot apply {event} in stage {stage:?}")]
    InvalidTransition {
        stage: JobStage,
        event: &'static str,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
