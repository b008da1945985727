//! REST client for the OpenAI chat-completion and image-generation
//! endpoints.

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::json;

use toon3d_core::style::DESCRIBE_INSTRUCTION;

use crate::config::OpenAiConfig;
use crate::error::StylizeError;
use crate::image_prep::png_data_url;

/// HTTP client for one OpenAI account.
pub struct OpenAiApi {
    client: reqwest::Client,
    config: OpenAiConfig,
}

/// Body of `POST /images/generations`.
#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u8,
    pub size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageGeneration {
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

impl OpenAiApi {
    pub fn new(config: OpenAiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Ask the vision model to describe a PNG. Returns the text of the
    /// first choice.
    pub async fn describe_image(&self, png: &[u8]) -> Result<String, StylizeError> {
        let body = json!({
            "model": self.config.vision_model,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": DESCRIBE_INSTRUCTION},
                    {"type": "image_url", "image_url": {"url": png_data_url(png)}},
                ],
            }],
        });

        let completion: ChatCompletion = self.post_json("/chat/completions", &body).await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(StylizeError::EmptyResponse("choices[0].message.content"))
    }

    /// Generate one image for `prompt` and return its hosted URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, StylizeError> {
        let body = ImageGenerationRequest {
            model: &self.config.image_model,
            prompt,
            n: 1,
            size: &self.config.image_size,
        };

        let generation: ImageGeneration = self.post_json("/images/generations", &body).await?;
        generation
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or(StylizeError::EmptyResponse("data[0].url"))
    }

    /// Download a generated image. Hosted URLs are pre-signed, so no
    /// credential is sent.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, StylizeError> {
        let response = ensure_success(self.client.get(url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, StylizeError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{path}", self.config.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(body)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StylizeError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(StylizeError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
