//! Fit-inside resizing with aspect ratio preservation
//!
//! Size calculation is integer-exact on the constrained axis: a source that
//! is wider than it is tall lands exactly on the box width, and the other
//! axis is rounded from the exact ratio.

use fast_image_resize as fr;
use fast_image_resize::images::{Image, ImageRef};
use image::RgbaImage;

use crate::ladder::Bounds;
use crate::utils::error::{Result, VariantError};

/// Resize filter algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Bilinear filtering (fastest)
    Triangle,

    /// Lanczos3 filtering (slower, sharpest for photographic downscales)
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for fr::FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Triangle => fr::FilterType::Bilinear,
            ResizeFilter::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}

/// Calculate the dimensions of `src` fitted inside `bounds`
///
/// # Behavior
/// - Maintains the original aspect ratio
/// - Never upscales (returns the source size if it already fits)
/// - Touches the box on at least one axis when shrinking
/// - Never returns a zero dimension for a non-empty source
///
/// # Examples
/// ```
/// use image_variants::image_processor::resizer::calculate_fit_size;
/// use image_variants::ladder::Bounds;
///
/// assert_eq!(calculate_fit_size(1600, 800, Bounds::new(800, 800)), (800, 400));
/// assert_eq!(calculate_fit_size(150, 150, Bounds::new(1200, 1200)), (150, 150));
/// ```
pub fn calculate_fit_size(src_width: u32, src_height: u32, bounds: Bounds) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (0, 0);
    }

    if bounds.contains(src_width, src_height) {
        return (src_width, src_height);
    }

    let (w, h) = (src_width as u64, src_height as u64);
    let (max_w, max_h) = (bounds.max_width as u64, bounds.max_height as u64);

    // Compare max_w / w against max_h / h without floating point
    let (new_w, new_h) = if max_w * h <= max_h * w {
        (max_w, ((h * max_w + w / 2) / w).min(max_h))
    } else {
        (((w * max_h + h / 2) / h).min(max_w), max_h)
    };

    (new_w.max(1) as u32, new_h.max(1) as u32)
}

/// Resize an RGBA image to exactly `target_width` x `target_height`
///
/// Uses fast_image_resize for SIMD-optimized convolution.
///
/// # Returns
/// * `Ok(RgbaImage)` - Resized image (a clone when dimensions already match)
/// * `Err(VariantError::Encode)` - Zero target size or resizer failure
pub fn resize_image(
    source: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: ResizeFilter,
) -> Result<RgbaImage> {
    let (src_width, src_height) = source.dimensions();

    if target_width == 0 || target_height == 0 {
        return Err(VariantError::Encode(
            "Target dimensions must be greater than zero".to_string(),
        ));
    }

    if src_width == target_width && src_height == target_height {
        return Ok(source.clone());
    }

    // Borrow the source pixels; the full-size buffer is never copied
    let src_view = ImageRef::new(src_width, src_height, source.as_raw(), fr::PixelType::U8x4)
    .map_err(|e| VariantError::Encode(format!("Failed to create source view: {}", e)))?;

    let mut dst_image = Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src_view,
            &mut dst_image,
            &fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(filter.into())),
        )
        .map_err(|e| VariantError::Encode(format!("Resize operation failed: {}", e)))?;

    RgbaImage::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| VariantError::Encode("Failed to create output image".to_string()))
}
