//! Integration tests for the batch tool over real directories

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use image_variants::{BatchProcessor, FsStore, VariantError, VariantGenerator, VariantStore};
use tempfile::TempDir;

fn write_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    fs::write(path, buf).unwrap();
}

/// Filesystem store that refuses writes ending in `refuse`
struct RefusingStore {
    refuse: &'static str,
}

impl VariantStore for RefusingStore {
    fn exists(&self, path: &Path) -> bool {
        FsStore.exists(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> image_variants::Result<()> {
        if path.to_string_lossy().ends_with(self.refuse) {
            return Err(VariantError::Write {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        FsStore.write(path, bytes)
    }
}

fn processor() -> BatchProcessor<FsStore> {
    BatchProcessor::new(VariantGenerator::new(FsStore))
}

fn webp_count(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".webp"))
        .count()
}

#[test]
fn test_corrupt_file_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    for i in 0..5 {
        write_png(&dir.path().join(format!("item{i}.png")), 300, 200);
    }
    fs::write(dir.path().join("broken.jpg"), b"this is not an image").unwrap();

    let report = processor().process_all(&[dir.path()]);

    assert_eq!(report.processed_count(), 5);
    assert_eq!(report.skipped_count(), 0);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("broken.jpg"));
    assert_eq!(report.variants_written, 25);
    assert_eq!(webp_count(dir.path()), 25);
    assert!(!dir.path().join("broken-medium.webp").exists());
}

#[test]
fn test_lone_variant_is_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("foo-medium.webp"), b"RIFF....WEBP").unwrap();

    let report = processor().process_directory(dir.path());

    assert_eq!(report.processed_count(), 0);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(webp_count(dir.path()), 1);
}

#[test]
fn test_missing_directory_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let present = dir.path().join("products");
    let missing = dir.path().join("categories");
    fs::create_dir(&present).unwrap();
    write_png(&present.join("a.png"), 50, 50);

    let report = processor().process_all(&[&missing, &present]);

    assert_eq!(report.missing_directories, vec![missing]);
    assert_eq!(report.processed_count(), 1);
    assert_eq!(report.failed_count(), 0);
}

#[test]
fn test_second_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("a.png"), 500, 500);
    write_png(&dir.path().join("b.png"), 80, 120);

    let first = processor().process_directory(dir.path());
    assert_eq!(first.processed_count(), 2);
    assert_eq!(first.variants_written, 10);

    let second = processor().process_directory(dir.path());
    assert_eq!(second.processed_count(), 2);
    assert_eq!(second.skipped_count(), 10);
    assert_eq!(second.variants_written, 0);
    assert_eq!(second.bytes_after, 0);
    assert_eq!(webp_count(dir.path()), 10);
}

#[test]
fn test_unsupported_files_and_subdirectories_are_ignored() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    write_png(&dir.path().join("nested").join("deep.png"), 10, 10);

    let report = processor().process_directory(dir.path());

    assert_eq!(report.processed_count(), 0);
    assert_eq!(report.skipped_unsupported, 1);
    assert!(report.is_clean());
    assert_eq!(webp_count(&dir.path().join("nested")), 0);
}

#[test]
fn test_failed_size_keeps_file_processed_but_not_clean() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("a.png"), 600, 600);

    let store = RefusingStore {
        refuse: "-small.webp",
    };
    let report = BatchProcessor::new(VariantGenerator::new(store)).process_directory(dir.path());

    assert_eq!(report.processed_count(), 1);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.variant_failures.len(), 1);
    assert!(report.variant_failures[0].path.ends_with("a.png"));
    assert!(report.variant_failures[0].message.starts_with("small: "));
    assert!(!report.is_clean());
    assert_eq!(report.variants_written, 4);
    assert!(!dir.path().join("a-small.webp").exists());
    assert!(report.to_string().contains("variant failed:"));
}
