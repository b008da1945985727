//! Input photo normalization.

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat};

use crate::error::StylizeError;

/// Decode a PNG or JPEG and re-encode it as an 8-bit RGB PNG, dropping
/// any alpha channel.
pub fn prepare_image(bytes: &[u8]) -> Result<Vec<u8>, StylizeError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(rgb).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// `data:image/png;base64,...` URL for inline submission to a vision model.
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}
