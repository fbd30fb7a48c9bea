//! Variant generation for one source image
//!
//! Walks the size ladder for a single source and writes each missing
//! variant exactly once. Existing variants are never overwritten or
//! recomputed, which makes repeated runs idempotent.
//!
//! The source is decoded lazily and at most once: a source whose variants
//! all exist is never decoded at all.
//!
//! Per-size failures (encode, write) are collected in the report and do not
//! stop the remaining sizes. Only a failure to decode the source fails the
//! whole call.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::image_processor::decoder;
use crate::image_processor::resizer::ResizeFilter;
use crate::image_processor::transcoder::{self, TranscodedImage};
use crate::ladder::{SizeLadder, SizeSpec};
use crate::naming::{self, SizeName};
use crate::storage::VariantStore;
use crate::utils::error::{Result, VariantError};

/// Where variants of one source are written and how they are addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Directory the variant files are written to
    pub dir: PathBuf,
    /// Public URL prefix for that directory, e.g. `/images/products`
    pub url_prefix: Option<String>,
}

impl Destination {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: None,
        }
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = Some(prefix.into());
        self
    }

    /// Filesystem path of a variant file
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Public URL of a variant file
    ///
    /// Without a prefix the file path itself is used.
    pub fn url_for(&self, file_name: &str) -> String {
        match &self.url_prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), file_name),
            None => self.path_for(file_name).to_string_lossy().into_owned(),
        }
    }
}

/// A variant written by this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVariant {
    pub size: SizeName,
    pub url: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Byte size of the source
    pub original_bytes: usize,
    /// Byte size of the encoded variant
    pub new_bytes: usize,
}

impl GeneratedVariant {
    /// Percentage of bytes saved against the source, negative when larger
    pub fn savings_percent(&self) -> i64 {
        savings_percent(self.original_bytes, self.new_bytes)
    }
}

/// A size that could not be produced
#[derive(Debug)]
pub struct VariantFailure {
    pub size: SizeName,
    pub error: VariantError,
}

/// Outcome of generating variants for one source
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Variants written by this run, in ladder order
    pub variants: Vec<GeneratedVariant>,
    /// Sizes that already existed and were left alone
    pub skipped: Vec<SizeName>,
    /// Sizes that failed
    pub failures: Vec<VariantFailure>,
    /// URL of every size that is now present, written or pre-existing
    pub urls: BTreeMap<SizeName, String>,
}

impl GenerationReport {
    /// URL of the full-resolution re-encode, if present
    pub fn original_variant_url(&self) -> Option<&str> {
        self.url(SizeName::Original)
    }

    /// URL offered for persisting into records: the medium variant
    pub fn primary_url(&self) -> Option<&str> {
        self.url(SizeName::Medium)
    }

    pub fn url(&self, size: SizeName) -> Option<&str> {
        self.urls.get(&size).map(String::as_str)
    }

    /// True when every size is present and nothing failed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Bytes written by this run
    pub fn bytes_written(&self) -> usize {
        self.variants.iter().map(|v| v.new_bytes).sum()
    }
}

/// Produces the ladder of variants for source images
#[derive(Debug, Clone)]
pub struct VariantGenerator<S> {
    store: S,
    ladder: SizeLadder,
    filter: ResizeFilter,
}

impl<S: VariantStore> VariantGenerator<S> {
    pub fn new(store: S) -> Self {
        Self::with_ladder(store, SizeLadder::standard())
    }

    pub fn with_ladder(store: S, ladder: SizeLadder) -> Self {
        Self {
            store,
            ladder,
            filter: ResizeFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn ladder(&self) -> &SizeLadder {
        &self.ladder
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generate every missing variant of `source` under `base_id`
    ///
    /// # Returns
    /// * `Ok(GenerationReport)` - Possibly partial; see `failures`
    /// * `Err(VariantError::Decode)` - The source could not be decoded
    /// * `Err(VariantError::InvalidPath)` - `base_id` is empty or contains a path separator
    pub fn generate(
        &self,
        source: &[u8],
        base_id: &str,
        dest: &Destination,
    ) -> Result<GenerationReport> {
        validate_base_id(base_id)?;

        let mut report = GenerationReport::default();
        let mut pending = Vec::new();

        for spec in self.ladder.iter() {
            let file_name = naming::variant_file_name(base_id, spec.name);
            let path = dest.path_for(&file_name);
            let url = dest.url_for(&file_name);

            if self.store.exists(&path) {
                debug!("Skipping {} (already exists)", path.display());
                report.skipped.push(spec.name);
                report.urls.insert(spec.name, url);
            } else {
                pending.push((spec, path, url));
            }
        }

        if pending.is_empty() {
            return Ok(report);
        }

        // Converted once; every size is cut from the same RGBA buffer
        let (decoded, format) = decoder::decode_image(source)?;
        let img = decoded.into_rgba8();
        debug!(
            "Decoded {} source {}: {}x{}",
            format.as_str(),
            base_id,
            img.width(),
            img.height()
        );

        for (spec, path, url) in pending {
            match self.produce(&img, spec, &path) {
                Ok(encoded) => {
                    let variant = GeneratedVariant {
                        size: spec.name,
                        url: url.clone(),
                        path,
                        width: encoded.width,
                        height: encoded.height,
                        original_bytes: source.len(),
                        new_bytes: encoded.bytes.len(),
                    };
                    info!(
                        "{} {}: {:.1}KB -> {:.1}KB ({}% saved)",
                        base_id,
                        spec.name,
                        variant.original_bytes as f64 / 1024.0,
                        variant.new_bytes as f64 / 1024.0,
                        variant.savings_percent()
                    );
                    report.urls.insert(spec.name, url);
                    report.variants.push(variant);
                }
                Err(error) => {
                    warn!("{} {} failed: {}", base_id, spec.name, error);
                    report.failures.push(VariantFailure {
                        size: spec.name,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Transcode and store one size
    fn produce(&self, img: &RgbaImage, spec: &SizeSpec, path: &Path) -> Result<TranscodedImage> {
        let encoded = transcoder::transcode_image(img, spec.bounds, spec.quality, self.filter)?;
        self.store.write(path, &encoded.bytes)?;
        Ok(encoded)
    }
}

/// Base identifiers become file name stems
fn validate_base_id(base_id: &str) -> Result<()> {
    if base_id.is_empty()
        || base_id.contains(['/', '\\'])
        || base_id == "."
        || base_id == ".."
    {
        return Err(VariantError::InvalidPath);
    }
    Ok(())
}

fn savings_percent(before: usize, after: usize) -> i64 {
    if before == 0 {
        return 0;
    }
    ((1.0 - after as f64 / before as f64) * 100.0).round() as i64
}
