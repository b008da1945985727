use std::path::PathBuf;
use std::time::Duration;

use toon3d_core::error::CoreError;
use toon3d_core::naming::DEFAULT_MODEL_DIR;
use toon3d_core::style::ArtStyle;
use toon3d_stylize::config::DEFAULT_BASE_URL;
use toon3d_stylize::OpenAiConfig;
use toon3d_tripo::config::{DEFAULT_TASK_URL, DEFAULT_UPLOAD_URL};
use toon3d_tripo::{PollConfig, TripoConfig};

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub tripo: TripoConfig,
    /// `None` when stylization is disabled.
    pub openai: Option<OpenAiConfig>,
    pub style: ArtStyle,
    /// Whether downloaded meshes are also exported as STL.
    pub export_stl: bool,
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default                          |
    /// |---------------------------|----------------------------------|
    /// | `TRIPO_API_KEY`           | required                         |
    /// | `TRIPO_UPLOAD_URL`        | production upload endpoint       |
    /// | `TRIPO_TASK_URL`          | production task endpoint         |
    /// | `OPENAI_API_KEY`          | required unless `SKIP_STYLIZE`   |
    /// | `OPENAI_BASE_URL`         | `https://api.openai.com/v1`      |
    /// | `ART_STYLE`               | `watercolor`                     |
    /// | `ILLUSTRATION_DIR`        | `.`                              |
    /// | `MODEL_DOWNLOAD_DIR`      | `./download_models`              |
    /// | `TASK_TIMEOUT_SECS`       | `300`                            |
    /// | `TASK_POLL_INTERVAL_SECS` | `5`                              |
    /// | `SKIP_STYLIZE`            | `false`                          |
    /// | `EXPORT_STL`              | `true`                           |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through
    /// `lookup`, so tests do not have to touch process state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("TRIPO_API_KEY")
            .ok_or_else(|| CoreError::Validation("TRIPO_API_KEY must be set".into()))?;

        let poll = PollConfig {
            timeout: Duration::from_secs(parse_u64(&var, "TASK_TIMEOUT_SECS", 300)?),
            interval: Duration::from_secs(parse_u64(&var, "TASK_POLL_INTERVAL_SECS", 5)?),
        };
        if poll.interval.is_zero() {
            return Err(CoreError::Validation(
                "TASK_POLL_INTERVAL_SECS must be at least 1".into(),
            ));
        }

        let tripo = TripoConfig::new(
            api_key,
            var("TRIPO_UPLOAD_URL").unwrap_or_else(|| DEFAULT_UPLOAD_URL.into()),
            var("TRIPO_TASK_URL").unwrap_or_else(|| DEFAULT_TASK_URL.into()),
        )
        .with_download_dir(var("MODEL_DOWNLOAD_DIR").unwrap_or_else(|| DEFAULT_MODEL_DIR.into()))
        .with_poll(poll);

        let style = match var("ART_STYLE") {
            Some(raw) => raw.parse()?,
            None => ArtStyle::default(),
        };

        let openai = if parse_bool(&var, "SKIP_STYLIZE", false)? {
            None
        } else {
            let key = var("OPENAI_API_KEY").ok_or_else(|| {
                CoreError::Validation(
                    "OPENAI_API_KEY must be set unless SKIP_STYLIZE=true".into(),
                )
            })?;
            let base_url = var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
            let output_dir = var("ILLUSTRATION_DIR").unwrap_or_else(|| ".".into());
            Some(
                OpenAiConfig::new(key)
                    .with_base_url(base_url)
                    .with_output_dir(PathBuf::from(output_dir)),
            )
        };

        Ok(Self {
            tripo,
            openai,
            style,
            export_stl: parse_bool(&var, "EXPORT_STL", true)?,
        })
    }
}

fn parse_u64<F>(var: &F, key: &str, default: u64) -> Result<u64, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| {
                CoreError::Validation(format!("{key} must be a whole number, got {raw:?}"))
            }),
        None => Ok(default),
    }
}

fn parse_bool<F>(var: &F, key: &str, default: bool) -> Result<bool, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CoreError::Validation(format!(
            "{key} must be true or false, got {raw:?}"
        ))),
    }
}
