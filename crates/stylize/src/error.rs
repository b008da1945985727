use std::path::PathBuf;

/// Errors from the stylization stage.
#[derive(Debug, thiserror::Error)]
pub enum StylizeError {
    /// The input photo could not be decoded or re-encoded.
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("OpenAI API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response decoded but carried no usable content.
    #[error("empty response: {0}")]
    EmptyResponse(&'static str),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
