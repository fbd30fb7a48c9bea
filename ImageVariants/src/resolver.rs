//! Read-path variant resolution
//!
//! Rendering code asks for "this image, at the size this context needs".
//! The size is chosen by display intent, never by probing which files exist.

use crate::naming::{self, SizeName};

/// Resolve a stored reference to the URL of its `size` variant
///
/// Accepts bare and tagged references alike; remote and empty references
/// come back unchanged.
pub fn resolve(reference: &str, size: SizeName) -> String {
    naming::url_for_size(reference, size)
}

/// Where on the page an image is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayContext {
    /// Small previews, admin tables, thumbnail rails
    ThumbnailRail,
    /// Product and category cards in a grid
    GridCard,
    /// Main image of a detail page
    DetailHero,
    /// Full-width banners and zoomed views
    FullBleedBanner,
}

impl DisplayContext {
    pub fn size(&self) -> SizeName {
        match self {
            Self::ThumbnailRail => SizeName::Thumbnail,
            Self::GridCard => SizeName::Small,
            Self::DetailHero => SizeName::Medium,
            Self::FullBleedBanner => SizeName::Large,
        }
    }
}

/// Pixel density of the target display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelDensity {
    #[default]
    Standard,
    /// 2x displays; the effective width is doubled
    High,
}

impl PixelDensity {
    fn factor(&self) -> u32 {
        match self {
            Self::Standard => 1,
            Self::High => 2,
        }
    }
}

/// Pick the logical size for an intended on-screen width
///
/// ≤200 effective px is `thumbnail`, ≤400 `small`, ≤800 `medium`, anything
/// wider `large`.
pub fn size_for_display_width(width: u32, density: PixelDensity) -> SizeName {
    let effective = width.saturating_mul(density.factor());
    match effective {
        0..=200 => SizeName::Thumbnail,
        201..=400 => SizeName::Small,
        401..=800 => SizeName::Medium,
        _ => SizeName::Large,
    }
}

/// Resolve a reference for a display context
pub fn resolve_for(reference: &str, context: DisplayContext) -> String {
    resolve(reference, context.size())
}
