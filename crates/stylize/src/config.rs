use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default OpenAI REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used to describe the input photo.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";

/// Model used to generate the illustration.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Requested illustration size.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Image generation routinely takes tens of seconds.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Settings for the OpenAI-backed stylizer. The API key is redacted from
/// `Debug` output.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub vision_model: String,
    pub image_model: String,
    pub image_size: String,
    /// Directory generated illustrations are written to.
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            output_dir: PathBuf::from("."),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("vision_model", &self.vision_model)
            .field("image_model", &self.image_model)
            .field("image_size", &self.image_size)
            .field("output_dir", &self.output_dir)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
