//! Batch variant generation over existing image directories
//!
//! Scans each directory (non-recursively) for source images that predate
//! eager generation and derives their variants. The scan is tolerant: a
//! missing directory is noted and skipped, and a file that cannot be read or
//! decoded is recorded as failed without stopping the batch.
//!
//! Running the batch twice writes nothing the second time, since the
//! generator skips variants that already exist.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::generator::{Destination, VariantGenerator};
use crate::image_processor;
use crate::naming;
use crate::storage::VariantStore;
use crate::utils::error::VariantError;

/// A source that could not be processed, or a size that could not be produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Sources the generator ran over successfully (possibly with per-size failures)
    pub processed: usize,
    /// Files skipped because they are variants themselves
    pub skipped_optimized: usize,
    /// Files skipped because their extension is not a supported source format
    pub skipped_unsupported: usize,
    /// Sources that failed entirely
    pub failed: usize,
    /// Variant files written during the run
    pub variants_written: usize,
    /// Source bytes of the sources that had variants written
    pub bytes_before: u64,
    /// Bytes of all variants written
    pub bytes_after: u64,
    /// Configured directories that did not exist
    pub missing_directories: Vec<PathBuf>,
    /// Whole-source failures
    pub failures: Vec<FileFailure>,
    /// Individual sizes that failed for otherwise processed sources
    pub variant_failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn processed_count(&self) -> usize {
        self.processed
    }

    /// Files skipped as already-optimized variants
    pub fn skipped_count(&self) -> usize {
        self.skipped_optimized
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Whether every candidate was processed without any failure
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.variant_failures.is_empty()
    }

    fn merge(&mut self, other: BatchReport) {
        self.processed += other.processed;
        self.skipped_optimized += other.skipped_optimized;
        self.skipped_unsupported += other.skipped_unsupported;
        self.failed += other.failed;
        self.variants_written += other.variants_written;
        self.bytes_before += other.bytes_before;
        self.bytes_after += other.bytes_after;
        self.missing_directories.extend(other.missing_directories);
        self.failures.extend(other.failures);
        self.variant_failures.extend(other.variant_failures);
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Processed {} file(s), skipped {} already-optimized, skipped {} unsupported, {} failed",
            self.processed, self.skipped_optimized, self.skipped_unsupported, self.failed
        )?;

        if self.variants_written > 0 {
            let saved = if self.bytes_before > 0 {
                ((1.0 - self.bytes_after as f64 / self.bytes_before as f64) * 100.0).round() as i64
            } else {
                0
            };
            writeln!(
                f,
                "Wrote {} variant(s): {:.1}KB of sources -> {:.1}KB of variants ({}% saved)",
                self.variants_written,
                self.bytes_before as f64 / 1024.0,
                self.bytes_after as f64 / 1024.0,
                saved
            )?;
        }

        for dir in &self.missing_directories {
            writeln!(f, "  missing directory: {}", dir.display())?;
        }
        for failure in &self.failures {
            writeln!(f, "  failed: {}: {}", failure.path.display(), failure.message)?;
        }
        for failure in &self.variant_failures {
            writeln!(
                f,
                "  variant failed: {}: {}",
                failure.path.display(),
                failure.message
            )?;
        }
        Ok(())
    }
}

/// What the scanner decided about one directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Source,
    AlreadyOptimized,
    Unsupported,
}

fn classify(file_name: &str) -> Candidate {
    if naming::is_tagged(file_name) {
        Candidate::AlreadyOptimized
    } else if image_processor::is_image_file(file_name) {
        Candidate::Source
    } else {
        Candidate::Unsupported
    }
}

/// Drives a [`VariantGenerator`] over whole directories
#[derive(Debug, Clone)]
pub struct BatchProcessor<S> {
    generator: VariantGenerator<S>,
}

impl<S: VariantStore> BatchProcessor<S> {
    pub fn new(generator: VariantGenerator<S>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &VariantGenerator<S> {
        &self.generator
    }

    /// Process every directory in turn and return the combined report
    ///
    /// Never fails: problems are recorded in the report.
    pub fn process_all<P: AsRef<Path>>(&self, directories: &[P]) -> BatchReport {
        let mut report = BatchReport::default();
        for dir in directories {
            report.merge(self.process_directory(dir.as_ref()));
        }
        report
    }

    /// Process the files directly inside one directory
    pub fn process_directory(&self, dir: &Path) -> BatchReport {
        let mut report = BatchReport::default();

        if !dir.is_dir() {
            warn!("{}, skipping", VariantError::MissingDirectory(dir.to_path_buf()));
            report.missing_directories.push(dir.to_path_buf());
            return report;
        }

        info!("Processing directory: {}", dir.display());

        // Snapshot the listing so variants written below are never picked up
        let entries: Vec<_> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .collect();

        let dest = Destination::new(dir);

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                    warn!("Failed to read entry in {}: {}", dir.display(), e);
                    report.failed += 1;
                    report.failures.push(FileFailure {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            match classify(&file_name) {
                Candidate::AlreadyOptimized => {
                    report.skipped_optimized += 1;
                    continue;
                }
                Candidate::Unsupported => {
                    debug!("Skipping unsupported file: {}", entry.path().display());
                    report.skipped_unsupported += 1;
                    continue;
                }
                Candidate::Source => {}
            }

            self.process_file(entry.path(), &dest, &mut report);
        }

        info!(
            "Finished {}: processed {}, skipped {} already-optimized, {} failed",
            dir.display(),
            report.processed,
            report.skipped_optimized,
            report.failed
        );
        report
    }

    fn process_file(&self, path: &Path, dest: &Destination, report: &mut BatchReport) {
        let Some(base_id) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping file with unusable name: {}", path.display());
            report.failed += 1;
            report.failures.push(FileFailure {
                path: path.to_path_buf(),
                message: VariantError::InvalidPath.to_string(),
            });
            return;
        };

        info!("Processing: {}", path.display());

        let result = std::fs::read(path)
            .map_err(VariantError::from)
            .and_then(|bytes| {
                self.generator
                    .generate(&bytes, base_id, dest)
                    .map(|generated| (bytes.len(), generated))
            });

        match result {
            Ok((source_len, generated)) => {
                report.processed += 1;
                if !generated.variants.is_empty() {
                    report.variants_written += generated.variants.len();
                    report.bytes_before += source_len as u64;
                    report.bytes_after += generated.bytes_written() as u64;
                }
                for failure in generated.failures {
                    report.variant_failures.push(FileFailure {
                        path: path.to_path_buf(),
                        message: format!("{}: {}", failure.size, failure.error),
                    });
                }
            }
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                report.failed += 1;
                report.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }
}
