//! Size ladder configuration
//!
//! The ladder is the fixed table of variants produced for every source image.
//! It is validated once when built and read-only afterwards.

use crate::naming::SizeName;
use crate::utils::error::{Result, VariantError};

/// Bounding box a variant must fit inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Bounds {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Whether a `width` x `height` image already fits without resizing
    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.max_width && height <= self.max_height
    }
}

/// One rung of the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub name: SizeName,
    /// `None` for the original rung, which is re-encoded at source size
    pub bounds: Option<Bounds>,
    /// Encoder quality, 0-100
    pub quality: u8,
}

impl SizeSpec {
    pub const fn boxed(name: SizeName, max_width: u32, max_height: u32, quality: u8) -> Self {
        Self {
            name,
            bounds: Some(Bounds::new(max_width, max_height)),
            quality,
        }
    }

    pub const fn original(quality: u8) -> Self {
        Self {
            name: SizeName::Original,
            bounds: None,
            quality,
        }
    }
}

/// Quality of the full-resolution re-encode
pub const ORIGINAL_QUALITY: u8 = 90;

/// The standard ladder
pub const STANDARD_SPECS: [SizeSpec; 5] = [
    SizeSpec::boxed(SizeName::Thumbnail, 200, 200, 70),
    SizeSpec::boxed(SizeName::Small, 400, 400, 75),
    SizeSpec::boxed(SizeName::Medium, 800, 800, 80),
    SizeSpec::boxed(SizeName::Large, 1200, 1200, 85),
    SizeSpec::original(ORIGINAL_QUALITY),
];

/// Validated, ordered list of [`SizeSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeLadder {
    specs: Vec<SizeSpec>,
}

impl SizeLadder {
    /// The fixed production ladder
    ///
    /// thumbnail 200x200 q70, small 400x400 q75, medium 800x800 q80,
    /// large 1200x1200 q85, original q90.
    pub fn standard() -> Self {
        Self {
            specs: STANDARD_SPECS.to_vec(),
        }
    }

    /// Build a ladder from an arbitrary table, validating it
    ///
    /// The table must list thumbnail, small, medium, large and original in
    /// that order; boxes must grow strictly on both axes; only `original` may
    /// be unboxed; every quality must be within 0-100.
    pub fn from_specs(specs: Vec<SizeSpec>) -> Result<Self> {
        let names: Vec<SizeName> = specs.iter().map(|s| s.name).collect();
        if names != SizeName::ALL {
            return Err(VariantError::InvalidLadder(format!(
                "expected sizes {:?}, got {:?}",
                SizeName::ALL,
                names
            )));
        }

        let mut previous: Option<Bounds> = None;
        for spec in &specs {
            if spec.quality > 100 {
                return Err(VariantError::InvalidLadder(format!(
                    "{} quality {} is outside 0-100",
                    spec.name, spec.quality
                )));
            }

            match (spec.name, spec.bounds) {
                (SizeName::Original, Some(_)) => {
                    return Err(VariantError::InvalidLadder(
                        "original must not have a bounding box".to_string(),
                    ));
                }
                (SizeName::Original, None) => {}
                (name, None) => {
                    return Err(VariantError::InvalidLadder(format!(
                        "{name} needs a bounding box"
                    )));
                }
                (name, Some(bounds)) => {
                    if bounds.max_width == 0 || bounds.max_height == 0 {
                        return Err(VariantError::InvalidLadder(format!(
                            "{name} box must be non-empty"
                        )));
                    }
                    if let Some(prev) = previous {
                        if bounds.max_width <= prev.max_width
                            || bounds.max_height <= prev.max_height
                        {
                            return Err(VariantError::InvalidLadder(format!(
                                "{name} box {}x{} does not exceed {}x{}",
                                bounds.max_width,
                                bounds.max_height,
                                prev.max_width,
                                prev.max_height
                            )));
                        }
                    }
                    previous = Some(bounds);
                }
            }
        }

        Ok(Self { specs })
    }

    /// All rungs in generation order, original last
    pub fn iter(&self) -> impl Iterator<Item = &SizeSpec> {
        self.specs.iter()
    }

    /// Rungs with a bounding box, smallest first
    pub fn boxed(&self) -> impl Iterator<Item = &SizeSpec> {
        self.specs.iter().filter(|s| s.bounds.is_some())
    }

    pub fn get(&self, name: SizeName) -> Option<&SizeSpec> {
        self.specs.iter().find(|s| s.name == name)
    }
}

impl Default for SizeLadder {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_ladder_is_valid() {
        let ladder = SizeLadder::from_specs(STANDARD_SPECS.to_vec()).unwrap();
        assert_eq!(ladder, SizeLadder::standard());
    }

    #[test]
    fn test_standard_values() {
        let ladder = SizeLadder::standard();
        let medium = ladder.get(SizeName::Medium).unwrap();
        assert_eq!(medium.bounds, Some(Bounds::new(800, 800)));
        assert_eq!(medium.quality, 80);

        let original = ladder.get(SizeName::Original).unwrap();
        assert_eq!(original.bounds, None);
        assert_eq!(original.quality, 90);

        assert_eq!(ladder.boxed().count(), 4);
        assert_eq!(ladder.iter().last().map(|s| s.name), Some(SizeName::Original));
    }

    #[test]
    fn test_rejects_non_increasing_boxes() {
        let mut specs = STANDARD_SPECS.to_vec();
        specs[2] = SizeSpec::boxed(SizeName::Medium, 400, 800, 80);
        assert!(matches!(
            SizeLadder::from_specs(specs),
            Err(VariantError::InvalidLadder(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_order() {
        let mut specs = STANDARD_SPECS.to_vec();
        specs.swap(0, 1);
        assert!(SizeLadder::from_specs(specs).is_err());
    }

    #[test]
    fn test_rejects_missing_rung() {
        let mut specs = STANDARD_SPECS.to_vec();
        specs.remove(3);
        assert!(SizeLadder::from_specs(specs).is_err());
    }

    #[test]
    fn test_rejects_bad_quality() {
        let mut specs = STANDARD_SPECS.to_vec();
        specs[0].quality = 101;
        assert!(SizeLadder::from_specs(specs).is_err());
    }

    #[test]
    fn test_rejects_boxed_original_and_unboxed_rung() {
        let mut specs = STANDARD_SPECS.to_vec();
        specs[4].bounds = Some(Bounds::new(4000, 4000));
        assert!(SizeLadder::from_specs(specs).is_err());

        let mut specs = STANDARD_SPECS.to_vec();
        specs[1].bounds = None;
        assert!(SizeLadder::from_specs(specs).is_err());
    }

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::new(800, 800);
        assert!(b.contains(800, 800));
        assert!(b.contains(150, 150));
        assert!(!b.contains(801, 10));
    }
}
