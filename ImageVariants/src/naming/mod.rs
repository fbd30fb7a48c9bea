//! Variant naming scheme
//!
//! Maps a base identifier and a logical size to a variant file name, and a
//! stored image reference to the URL of one of its variants.
//!
//! Every derived file is named `{base}-{size}.webp`. A stored reference comes
//! in two shapes:
//!
//! - **bare**: `/images/products/3f2a.jpg` (a source upload or legacy URL)
//! - **tagged**: `/images/products/3f2a-medium.webp` (already a variant)
//!
//! [`url_for_size`] accepts either shape and produces the tagged URL for the
//! requested size. Remote references (`http://`, `https://`) are returned
//! untouched since their variants were never derived locally.
//!
//! All functions here are pure.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::ladder::SizeLadder;

/// Extension of every encoded variant
pub const ENCODED_EXT: &str = "webp";

/// Matches the size tag at the end of a variant name or URL
static TAGGED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-(thumbnail|small|medium|large|original)\.webp$")
        .expect("static variant pattern is valid")
});

/// Logical size of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeName {
    Thumbnail,
    Small,
    Medium,
    Large,
    /// Full-resolution re-encode, never resized
    Original,
}

impl SizeName {
    /// All sizes, smallest first, `Original` last
    pub const ALL: [SizeName; 5] = [
        Self::Thumbnail,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Original,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Original => "original",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "thumbnail" => Some(Self::Thumbnail),
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "original" => Some(Self::Original),
            _ => None,
        }
    }
}

impl fmt::Display for SizeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_opt(s).ok_or_else(|| format!("unknown size name: {s}"))
    }
}

/// File name of the `size` variant of `base`
///
/// # Examples
/// ```
/// use image_variants::naming::{variant_file_name, SizeName};
///
/// assert_eq!(variant_file_name("3f2a", SizeName::Small), "3f2a-small.webp");
/// ```
pub fn variant_file_name(base: &str, size: SizeName) -> String {
    format!("{base}-{size}.{ENCODED_EXT}")
}

/// True iff `reference` already ends in a `-{size}.webp` tag
pub fn is_tagged(reference: &str) -> bool {
    TAGGED_PATTERN.is_match(reference)
}

/// Splits a tagged name into its base and size
///
/// Returns `None` for bare references.
pub fn parse_tagged(reference: &str) -> Option<(&str, SizeName)> {
    let caps = TAGGED_PATTERN.captures(reference)?;
    let whole = caps.get(0)?;
    let size = SizeName::from_str_opt(caps.get(1)?.as_str())?;
    Some((&reference[..whole.start()], size))
}

/// Whether the reference points at a remote asset
pub fn is_remote(reference: &str) -> bool {
    let lower = reference
        .get(..8)
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| reference.to_ascii_lowercase());
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// URL of the `size` variant for a stored reference
///
/// - empty references come back empty (the caller renders "no image")
/// - remote references come back unchanged
/// - tagged references get their tag swapped
/// - bare references lose their extension and gain the tag
///
/// A reference without an extension is tagged as-is. Query strings and
/// fragments are not supported: `a-small.webp?v=2` is not seen as tagged, so
/// strip them before resolving.
///
/// # Examples
/// ```
/// use image_variants::naming::{url_for_size, SizeName};
///
/// assert_eq!(
///     url_for_size("/images/products/a.jpg", SizeName::Small),
///     "/images/products/a-small.webp"
/// );
/// assert_eq!(
///     url_for_size("/images/products/a-small.webp", SizeName::Large),
///     "/images/products/a-large.webp"
/// );
/// ```
pub fn url_for_size(reference: &str, size: SizeName) -> String {
    if reference.is_empty() || is_remote(reference) {
        return reference.to_string();
    }

    if let Some((base, _)) = parse_tagged(reference) {
        return variant_file_name(base, size);
    }

    variant_file_name(strip_extension(reference), size)
}

/// Removes the extension of the last path segment, if any
fn strip_extension(reference: &str) -> &str {
    let segment_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
    match reference[segment_start..].rfind('.') {
        // A leading dot names a hidden file, not an extension
        Some(0) | None => reference,
        Some(dot) => &reference[..segment_start + dot],
    }
}

/// Responsive `srcset` attribute value for a stored reference
///
/// Lists every boxed rung of the ladder with its width descriptor. Empty and
/// remote references produce an empty string.
pub fn srcset(reference: &str, ladder: &SizeLadder) -> String {
    if reference.is_empty() || is_remote(reference) {
        return String::new();
    }

    ladder
        .boxed()
        .filter_map(|spec| {
            spec.bounds
                .map(|b| format!("{} {}w", url_for_size(reference, spec.name), b.max_width))
        })
        .collect::<Vec<_>>()
        .join(", ")
}
