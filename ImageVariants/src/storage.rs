//! Variant storage
//!
//! The generator only needs two things from storage: whether a variant is
//! already present, and a way to write one so that a failed write leaves
//! nothing behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::utils::error::{Result, VariantError};

/// Destination for variant files
pub trait VariantStore {
    /// Whether a variant already exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Write `bytes` to `path`
    ///
    /// On error, no file may be left at `path`.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

impl<S: VariantStore + ?Sized> VariantStore for &S {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        (**self).write(path, bytes)
    }
}

/// Local filesystem store
///
/// Writes go to a temporary file in the destination directory, which is then
/// renamed over the final path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl VariantStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let wrap = |source: std::io::Error| VariantError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(wrap)?;

        // Dropping the temp file on any error below removes it
        let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
        tmp.write_all(bytes).map_err(wrap)?;
        tmp.as_file().sync_all().map_err(wrap)?;
        tmp.persist(path).map_err(|e| wrap(e.error))?;

        tracing::trace!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
