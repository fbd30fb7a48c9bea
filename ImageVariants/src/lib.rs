//! ImageVariants - sized WebP variants for catalog images
//!
//! Every uploaded product or category image is re-encoded into a fixed ladder
//! of WebP variants (`thumbnail`, `small`, `medium`, `large`, `original`) that
//! sit next to the source and share its base name. Rendering code resolves a
//! stored reference to the variant it needs with a pure string rewrite, and
//! degrades through [`FallbackImageLoad`] when a variant is missing.
//!
//! Variants are produced on two paths: eagerly by [`UploadService`] when a
//! file is uploaded, and in bulk by [`BatchProcessor`] for images that predate
//! eager generation. Both skip variants that already exist.

pub mod batch;
pub mod config;
pub mod fallback;
pub mod generator;
pub mod image_processor;
pub mod ladder;
pub mod naming;
pub mod resolver;
pub mod storage;
pub mod upload;
pub mod utils;

pub use batch::{BatchProcessor, BatchReport};
pub use config::Settings;
pub use fallback::{FallbackImageLoad, LoadAttemptState, LoadEvent};
pub use generator::{Destination, GenerationReport, VariantGenerator};
pub use ladder::{Bounds, SizeLadder, SizeSpec};
pub use naming::{is_tagged, url_for_size, SizeName};
pub use resolver::{resolve, DisplayContext, PixelDensity};
pub use storage::{FsStore, VariantStore};
pub use upload::{Collection, UploadOutcome, UploadService, UploadedFile};
pub use utils::error::{Result, VariantError};
