//! Illustration style presets and prompt construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Instruction sent with the photo when asking the vision model for a
/// description.
pub const DESCRIBE_INSTRUCTION: &str = "Describe the features of this image.";

/// Art style applied when turning a photo description into an
/// illustration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtStyle {
    /// Gentle, soft watercolor.
    #[default]
    Watercolor,
    /// Sparkling, cinematic lighting.
    Cinematic,
    /// Classic energetic shōnen manga / anime.
    Shonen,
    /// Fluffy everyday slice-of-life characters.
    SliceOfLife,
    /// Retro anime of the Shōwa / early Heisei era.
    Retro,
    /// Chibi, super-deformed proportions.
    Chibi,
    /// Monochrome manga ink.
    MangaInk,
}

impl ArtStyle {
    /// All presets in menu order.
    pub const ALL: [ArtStyle; 7] = [
        ArtStyle::Watercolor,
        ArtStyle::Cinematic,
        ArtStyle::Shonen,
        ArtStyle::SliceOfLife,
        ArtStyle::Retro,
        ArtStyle::Chibi,
        ArtStyle::MangaInk,
    ];

    /// Configuration slug, e.g. `slice-of-life`.
    pub fn slug(self) -> &'static str {
        match self {
            ArtStyle::Watercolor => "watercolor",
            ArtStyle::Cinematic => "cinematic",
            ArtStyle::Shonen => "shonen",
            ArtStyle::SliceOfLife => "slice-of-life",
            ArtStyle::Retro => "retro",
            ArtStyle::Chibi => "chibi",
            ArtStyle::MangaInk => "manga-ink",
        }
    }

    /// Human-readable label embedded in the generation prompt.
    pub fn label(self) -> &'static str {
        match self {
            ArtStyle::Watercolor => "heartwarming, gentle watercolor",
            ArtStyle::Cinematic => "sparkling, cinematic",
            ArtStyle::Shonen => "classic shonen manga, energetic anime",
            ArtStyle::SliceOfLife => "soft and fluffy slice-of-life character",
            ArtStyle::Retro => "retro anime, Showa to early Heisei era",
            ArtStyle::Chibi => "chibi, super-deformed",
            ArtStyle::MangaInk => "manga, monochrome ink",
        }
    }

    /// Build the image-generation prompt for a photo description.
    pub fn prompt(self, description: &str) -> String {
        format!(
            "Turn the person with the following features into an anime illustration \
             in the {} style: {description}",
            self.label()
        )
    }
}

impl fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ArtStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ArtStyle::ALL
            .into_iter()
            .find(|style| style.slug() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = ArtStyle::ALL.iter().map(|s| s.slug()).collect();
                CoreError::Validation(format!(
                    "Unknown art style: '{s}'. Valid styles: {}",
                    valid.join(", ")
                ))
            })
    }
}
