//! Image processing for variant generation
//!
//! This module turns uploaded source bytes into re-encoded variant bytes.
//!
//! # Architecture
//!
//! - **magic**: Identifies the input format from its leading bytes
//! - **decoder**: Decodes accepted inputs using the `image` crate
//! - **resizer**: Calculates fit-inside dimensions and performs SIMD resizing
//! - **transcoder**: Orchestrates resize plus WebP encoding for one size
//!
//! # Pipeline
//!
//! 1. Sniff the format and decode the source (once per source image)
//! 2. Calculate the target size (aspect ratio preserved, no upscaling)
//! 3. Resize with Lanczos3 when the source exceeds the box
//! 4. Encode to lossy WebP at the rung's quality
//!
//! # Supported Input Formats
//!
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - WebP (.webp)
//! - GIF (.gif), first frame only
//!
//! Output is always WebP regardless of input.

pub mod decoder;
pub mod magic;
pub mod resizer;
pub mod transcoder;

/// Accepted source file extensions
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Accepted upload content types
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Check if a file name has a supported source extension
///
/// Case-insensitive; files without an extension are not images.
///
/// # Examples
/// ```
/// use image_variants::image_processor::is_image_file;
///
/// assert!(is_image_file("shoe.jpg"));
/// assert!(is_image_file("cover.PNG"));
/// assert!(!is_image_file("readme.txt"));
/// ```
pub fn is_image_file(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check if an upload content type is accepted
pub fn is_supported_content_type(content_type: &str) -> bool {
    SUPPORTED_CONTENT_TYPES.contains(&content_type.trim().to_lowercase().as_str())
}

/// Default file extension for an accepted content type
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
