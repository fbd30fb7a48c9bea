//! Image format detection using magic headers (file signatures)
//!
//! Only the four accepted source formats are recognized:
//!
//! - **JPEG**: `FF D8 FF`
//! - **PNG**: `89 50 4E 47 0D 0A 1A 0A`
//! - **GIF**: `47 49 46 38` (GIF87a/GIF89a)
//! - **WebP**: `52 49 46 46 ... 57 45 42 50` (RIFF....WEBP)
//!
//! Sniffing the header means a file named `.jpg` that is really a BMP, or a
//! renamed text file, is rejected before the decoder is involved.

use crate::utils::error::{Result, VariantError};

/// Accepted source format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::WebP => "WebP",
        }
    }

    /// Matching `image` crate format
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Gif => image::ImageFormat::Gif,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Detect the source format from magic bytes
///
/// # Returns
/// * `Ok(SourceFormat)` - One of the accepted formats
/// * `Err(VariantError::UnsupportedFormat)` - Empty, truncated or unrecognized data
pub fn detect_source_format(data: &[u8]) -> Result<SourceFormat> {
    const MIN_BYTES: usize = 4;
    if data.len() < MIN_BYTES {
        return Err(VariantError::UnsupportedFormat(format!(
            "need at least {} bytes to identify an image, got {}",
            MIN_BYTES,
            data.len()
        )));
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(SourceFormat::Jpeg);
    }

    if data.starts_with(PNG_SIGNATURE) {
        return Ok(SourceFormat::Png);
    }

    if data.starts_with(b"GIF8") {
        return Ok(SourceFormat::Gif);
    }

    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Ok(SourceFormat::WebP);
    }

    Err(VariantError::UnsupportedFormat(format!(
        "unrecognized image header {:02X?}",
        &data[..data.len().min(16)]
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
    const PNG_HEADER: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ];
    const GIF_HEADER: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";
    const WEBP_HEADER: &[u8] = b"RIFF\x00\x00\x00\x00WEBPVP8 ";
    const BMP_HEADER: &[u8] = &[0x42, 0x4D, 0x46, 0x00, 0x00, 0x00];

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_source_format(JPEG_HEADER).unwrap(), SourceFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        assert_eq!(detect_source_format(PNG_HEADER).unwrap(), SourceFormat::Png);
    }

    #[test]
    fn test_detect_gif() {
        assert_eq!(detect_source_format(GIF_HEADER).unwrap(), SourceFormat::Gif);
    }

    #[test]
    fn test_detect_webp() {
        let format = detect_source_format(WEBP_HEADER).unwrap();
        assert_eq!(format, SourceFormat::WebP);
        assert_eq!(format.as_str(), "WebP");
        assert_eq!(format.to_image_format(), image::ImageFormat::WebP);
    }

    #[test]
    fn test_rejects_bmp() {
        assert!(matches!(
            detect_source_format(BMP_HEADER),
            Err(VariantError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_riff_without_webp() {
        assert!(detect_source_format(b"RIFF\x00\x00\x00\x00WAVEfmt ").is_err());
    }

    #[test]
    fn test_rejects_short_and_empty() {
        assert!(detect_source_format(&[]).is_err());
        assert!(detect_source_format(&[0xFF, 0xD8]).is_err());
    }

    #[test]
    fn test_rejects_text() {
        assert!(detect_source_format(b"This is not an image file").is_err());
    }
}
