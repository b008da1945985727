//! Tripo image-to-3D REST client.
//!
//! Drives one remote generation job through its lifecycle: upload an
//! image, submit an `image_to_model` task, poll the task until it reaches
//! a terminal status, and download the resulting mesh. The client keeps
//! no job state between calls; callers thread the [`AssetToken`],
//! [`TaskHandle`] and [`TaskResult`] values through themselves.

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod messages;
pub mod poll;

pub use api::TripoApi;
pub use config::TripoConfig;
pub use error::{RequestError, TripoError};
pub use messages::{AssetToken, TaskHandle, TaskResult, TaskStatus};
pub use poll::PollConfig;
