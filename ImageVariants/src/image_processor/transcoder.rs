//! Transcoding one source image into one variant
//!
//! Every variant is lossy WebP, whatever the input format was. Sources that
//! already fit inside the requested box are re-encoded at their own size.

use image::RgbaImage;

use super::decoder;
use super::resizer::{self, ResizeFilter};
use crate::ladder::Bounds;
use crate::utils::error::{Result, VariantError};

/// Largest dimension libwebp accepts
const WEBP_MAX_DIMENSION: u32 = 16_383;

/// Encoded variant bytes with their pixel dimensions
#[derive(Debug, Clone)]
pub struct TranscodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode `data` and transcode it into a single variant
///
/// `bounds` of `None` means a pass-through re-encode at source size.
///
/// # Returns
/// * `Ok(TranscodedImage)` - WebP bytes and output dimensions
/// * `Err(VariantError::Decode)` - `data` is not an accepted image
/// * `Err(VariantError::Encode)` - Resize or WebP encoding failed
pub fn transcode(data: &[u8], bounds: Option<Bounds>, quality: u8) -> Result<TranscodedImage> {
    let (img, _) = decoder::decode_image(data)?;
    transcode_image(&img.to_rgba8(), bounds, quality, ResizeFilter::default())
}

/// Transcode already-decoded RGBA pixels into a single variant
///
/// Lets the generator decode and convert once, then reuse the pixels for
/// every size.
pub fn transcode_image(
    img: &RgbaImage,
    bounds: Option<Bounds>,
    quality: u8,
    filter: ResizeFilter,
) -> Result<TranscodedImage> {
    let (src_width, src_height) = img.dimensions();

    let (target_width, target_height) = match bounds {
        Some(b) => resizer::calculate_fit_size(src_width, src_height, b),
        None => (src_width, src_height),
    };

    if target_width == 0 || target_height == 0 {
        return Err(VariantError::Encode(
            "Invalid image dimensions (0x0)".to_string(),
        ));
    }

    let bytes = if (target_width, target_height) == (src_width, src_height) {
        encode_webp(img.as_raw(), target_width, target_height, quality)?
    } else {
        let resized = resizer::resize_image(img, target_width, target_height, filter)?;
        encode_webp(resized.as_raw(), target_width, target_height, quality)?
    };

    Ok(TranscodedImage {
        bytes,
        width: target_width,
        height: target_height,
    })
}

/// Encode RGBA pixels as lossy WebP
fn encode_webp(rgba: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>> {
    if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
        return Err(VariantError::Encode(format!(
            "{}x{} exceeds the WebP limit of {} pixels per side",
            width, height, WEBP_MAX_DIMENSION
        )));
    }

    let encoder = webp::Encoder::from_rgba(rgba, width, height);
    let memory = encoder
        .encode_simple(false, f32::from(quality.min(100)))
        .map_err(|e| VariantError::Encode(format!("WebP encoding failed: {:?}", e)))?;

    Ok(memory.to_vec())
}
