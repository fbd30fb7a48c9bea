//! Image decoding from raw bytes
//!
//! The format is taken from the magic header rather than guessed by the
//! decoder, so only the accepted source formats ever reach it.

use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use super::magic::{self, SourceFormat};
use crate::utils::error::{Result, VariantError};

/// Decode a source image from raw bytes
///
/// # Returns
/// * `Ok((DynamicImage, SourceFormat))` - Decoded pixels and the detected format
/// * `Err(VariantError::Decode)` - Empty, unrecognized or corrupt data
pub fn decode_image(data: &[u8]) -> Result<(DynamicImage, SourceFormat)> {
    if data.is_empty() {
        return Err(VariantError::Decode("Empty image data".to_string()));
    }

    let format = magic::detect_source_format(data)
        .map_err(|e| VariantError::Decode(format!("Format detection failed: {}", e)))?;

    let img = ImageReader::with_format(Cursor::new(data), format.to_image_format())
        .decode()
        .map_err(|e| {
            VariantError::Decode(format!("Failed to decode {} image: {}", format.as_str(), e))
        })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(VariantError::Decode(
            "Decoded image has zero dimensions".to_string(),
        ));
    }

    tracing::debug!(
        "Decoded {} image: {}x{}",
        format.as_str(),
        img.width(),
        img.height()
    );
    Ok((img, format))
}
