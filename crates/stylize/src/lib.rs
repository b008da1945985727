//! Photo to anime-style illustration via hosted OpenAI models.
//!
//! A photo is normalized to an RGB PNG, described by a vision model, and
//! the description plus an [`ArtStyle`](toon3d_core::style::ArtStyle)
//! preset becomes the prompt for an image model. The generated picture
//! is saved locally so it can be uploaded to the mesh service.

pub mod config;
pub mod error;
pub mod image_prep;
pub mod openai;
pub mod stylizer;

pub use config::OpenAiConfig;
pub use error::StylizeError;
pub use openai::OpenAiApi;
pub use stylizer::{Illustration, Stylizer};
