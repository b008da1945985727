//! File-naming rules for generated artifacts.
//!
//! Downloaded meshes and generated illustrations are named from the local
//! wall-clock time at which they were written. Two artifacts of the same
//! kind written within the same second share a name; the later write
//! replaces the earlier one.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default directory for downloaded meshes.
pub const DEFAULT_MODEL_DIR: &str = "./download_models";

/// Prefix of downloaded mesh files.
pub const MODEL_FILE_PREFIX: &str = "model_";

/// Extension of downloaded mesh files (binary glTF).
pub const MODEL_FILE_EXTENSION: &str = "glb";

/// Prefix of generated illustration files.
pub const ILLUSTRATION_FILE_PREFIX: &str = "anime_";

/// Extension of converted meshes.
pub const STL_FILE_EXTENSION: &str = "stl";

/// Name used for uploads whose path has no usable file name.
const FALLBACK_UPLOAD_NAME: &str = "image.png";

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// `model_<YYYYMMDD_HHMMSS>.glb`
pub fn model_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{MODEL_FILE_PREFIX}{}.{MODEL_FILE_EXTENSION}",
        at.format("%Y%m%d_%H%M%S")
    )
}

/// `anime_<YYYYMMDDHHMMSS>.png`
pub fn illustration_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{ILLUSTRATION_FILE_PREFIX}{}.png", at.format("%Y%m%d%H%M%S"))
}

/// Path of the STL export for a downloaded mesh: same directory and stem,
/// `.stl` extension.
pub fn stl_path_for(model_path: &Path) -> PathBuf {
    model_path.with_extension(STL_FILE_EXTENSION)
}

/// File name sent alongside an uploaded image (the path's basename).
pub fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_UPLOAD_NAME)
        .to_string()
}
