//! Photo -> description -> illustration, saved to disk.

use std::path::{Path, PathBuf};

use chrono::Local;
use toon3d_core::naming::illustration_file_name;
use toon3d_core::style::ArtStyle;

use crate::error::StylizeError;
use crate::image_prep::prepare_image;
use crate::openai::OpenAiApi;

/// Result of stylizing one photo.
#[derive(Debug, Clone)]
pub struct Illustration {
    /// Vision-model description of the photo.
    pub description: String,
    /// Prompt sent to the image model.
    pub prompt: String,
    /// Hosted URL of the generated image.
    pub remote_url: String,
    /// Where the image was saved.
    pub path: PathBuf,
}

/// Runs the full stylization stage against an [`OpenAiApi`].
pub struct Stylizer {
    api: OpenAiApi,
}

impl Stylizer {
    pub fn new(api: OpenAiApi) -> Self {
        Self { api }
    }

    /// Stylize the photo at `photo` and save the illustration as
    /// `anime_<YYYYMMDDHHMMSS>.png` in the configured output directory.
    pub async fn stylize(
        &self,
        photo: &Path,
        style: ArtStyle,
    ) -> Result<Illustration, StylizeError> {
        let raw = tokio::fs::read(photo).await.map_err(|source| StylizeError::Io {
            path: photo.to_path_buf(),
            source,
        })?;
        let png = prepare_image(&raw)?;

        let description = self.api.describe_image(&png).await?;
        tracing::info!(chars = description.len(), "Photo described");

        let prompt = style.prompt(&description);
        let remote_url = self.api.generate_image(&prompt).await?;
        tracing::info!(%style, "Illustration generated");

        let bytes = self.api.fetch_image(&remote_url).await?;
        let dir = &self.api.config().output_dir;
        tokio::fs::create_dir_all(dir).await.map_err(|source| StylizeError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(illustration_file_name(&Local::now()));
        tokio::fs::write(&path, &bytes).await.map_err(|source| StylizeError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), size = bytes.len(), "Illustration saved");
        Ok(Illustration {
            description,
            prompt,
            remote_url,
            path,
        })
    }
}
