//! Upload intake
//!
//! Validates an uploaded image, stores it under a fresh identifier and
//! generates its variants eagerly. The caller persists the returned primary
//! URL into the product or category record.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::config::Settings;
use crate::generator::{Destination, GenerationReport, VariantGenerator};
use crate::image_processor::{self, magic};
use crate::naming::SizeName;
use crate::storage::VariantStore;
use crate::utils::error::{Result, VariantError};

/// Record type an image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Categories,
}

impl Collection {
    /// Subdirectory below the image namespace
    pub fn sub_dir(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
        }
    }

    /// Parse the form field sent by the admin UI; anything but `category` is a product
    pub fn from_form_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("category") {
            Self::Categories
        } else {
            Self::Products
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sub_dir())
    }
}

/// An uploaded file as received by the request handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Result of a successful upload
#[derive(Debug)]
pub struct UploadOutcome {
    /// Identifier shared by the source and its variants
    pub base_id: String,
    /// URL to persist: medium, else original, else the stored source
    pub url: String,
    /// URL of the stored source file
    pub source_url: String,
    /// URL of every variant present
    pub urls: BTreeMap<SizeName, String>,
    pub report: GenerationReport,
}

/// Accepts uploads into the public image tree
#[derive(Debug, Clone)]
pub struct UploadService<S> {
    generator: VariantGenerator<S>,
    settings: Settings,
}

impl<S: VariantStore> UploadService<S> {
    pub fn new(generator: VariantGenerator<S>, settings: Settings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate, store and derive variants for one upload
    ///
    /// # Errors
    /// * `NoFileProvided` - the request carried no file
    /// * `UnsupportedFormat` - content type or sniffed bytes are not JPEG/PNG/WebP/GIF
    /// * `FileTooLarge` - payload exceeds the configured limit
    /// * `Decode` - bytes look like an image but cannot be decoded
    /// * `Write` - the source could not be stored
    pub fn accept(&self, file: Option<UploadedFile>, collection: Collection) -> Result<UploadOutcome> {
        let file = file.ok_or(VariantError::NoFileProvided)?;

        if !image_processor::is_supported_content_type(&file.content_type) {
            return Err(VariantError::UnsupportedFormat(format!(
                "content type {:?} is not accepted; use JPG, PNG, WebP or GIF",
                file.content_type
            )));
        }

        if file.bytes.len() > self.settings.max_upload_bytes {
            return Err(VariantError::FileTooLarge {
                size: file.bytes.len(),
                limit: self.settings.max_upload_bytes,
            });
        }

        magic::detect_source_format(&file.bytes)?;

        let extension = source_extension(&file)?;
        let base_id = Uuid::new_v4().simple().to_string();
        let source_name = format!("{base_id}.{extension}");

        let dir = self.settings.collection_dir(collection.sub_dir());
        let dest = Destination::new(&dir)
            .with_url_prefix(self.settings.collection_url(collection.sub_dir()));

        // Undecodable bytes fail here, before the source is stored
        let report = self.generator.generate(&file.bytes, &base_id, &dest)?;

        self.generator
            .store()
            .write(&dest.path_for(&source_name), &file.bytes)?;
        let source_url = dest.url_for(&source_name);

        let url = report
            .primary_url()
            .or_else(|| report.original_variant_url())
            .unwrap_or(&source_url)
            .to_string();

        info!(
            "Stored upload {} as {} ({} variants, {} failed)",
            file.file_name,
            url,
            report.urls.len(),
            report.failures.len()
        );

        Ok(UploadOutcome {
            base_id,
            url,
            source_url,
            urls: report.urls.clone(),
            report,
        })
    }

    /// Directory uploads for a collection land in
    pub fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.settings.collection_dir(collection.sub_dir())
    }
}

/// Extension for the stored source: from the file name, else the content type
fn source_extension(file: &UploadedFile) -> Result<String> {
    let from_name = Path::new(&file.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .filter(|e| image_processor::SUPPORTED_EXTENSIONS.contains(&e.as_str()));

    match from_name {
        Some(ext) => Ok(ext),
        None => image_processor::extension_for_content_type(&file.content_type)
            .map(str::to_string)
            .ok_or_else(|| VariantError::UnsupportedFormat(file.content_type.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStore;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([9, 9, 9, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn service(root: &Path) -> UploadService<FsStore> {
        let settings = Settings {
            public_root: root.to_path_buf(),
            ..Settings::default()
        };
        UploadService::new(VariantGenerator::new(FsStore), settings)
    }

    /// Filesystem store that refuses writes ending in any of `refuse`
    struct RefusingStore {
        refuse: Vec<&'static str>,
    }

    impl VariantStore for RefusingStore {
        fn exists(&self, path: &Path) -> bool {
            FsStore.exists(path)
        }

        fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
            let name = path.to_string_lossy();
            if self.refuse.iter().any(|suffix| name.ends_with(suffix)) {
                return Err(VariantError::Write {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            FsStore.write(path, bytes)
        }
    }

    fn refusing_service(root: &Path, refuse: Vec<&'static str>) -> UploadService<RefusingStore> {
        let settings = Settings {
            public_root: root.to_path_buf(),
            ..Settings::default()
        };
        UploadService::new(VariantGenerator::new(RefusingStore { refuse }), settings)
    }

    fn upload(name: &str, content_type: &str, bytes: Vec<u8>) -> Option<UploadedFile> {
        Some(UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        })
    }

    #[test]
    fn test_accept_generates_variants() {
        let root = TempDir::new().unwrap();
        let svc = service(root.path());

        let outcome = svc
            .accept(upload("red shoe.PNG", "image/png", png(1000, 500)), Collection::Products)
            .unwrap();

        assert_eq!(outcome.base_id.len(), 32);
        assert_eq!(
            outcome.url,
            format!("/images/products/{}-medium.webp", outcome.base_id)
        );
        assert_eq!(
            outcome.source_url,
            format!("/images/products/{}.png", outcome.base_id)
        );
        assert_eq!(outcome.urls.len(), 5);

        let dir = root.path().join("images/products");
        assert!(dir.join(format!("{}.png", outcome.base_id)).is_file());
        for size in SizeName::ALL {
            assert!(dir.join(format!("{}-{}.webp", outcome.base_id, size)).is_file());
        }
    }

    #[test]
    fn test_primary_url_falls_back_when_sizes_fail() {
        let root = TempDir::new().unwrap();

        let outcome = refusing_service(root.path(), vec!["-medium.webp"])
            .accept(upload("a.png", "image/png", png(900, 600)), Collection::Products)
            .unwrap();
        assert_eq!(
            outcome.url,
            format!("/images/products/{}-original.webp", outcome.base_id)
        );
        assert_eq!(outcome.report.failures.len(), 1);
        assert!(!outcome.urls.contains_key(&SizeName::Medium));

        let outcome = refusing_service(root.path(), vec!["-medium.webp", "-original.webp"])
            .accept(upload("b.png", "image/png", png(900, 600)), Collection::Products)
            .unwrap();
        assert_eq!(outcome.url, outcome.source_url);
        assert_eq!(
            outcome.url,
            format!("/images/products/{}.png", outcome.base_id)
        );
        assert_eq!(outcome.report.failures.len(), 2);
    }

    #[test]
    fn test_categories_go_to_their_own_directory() {
        let root = TempDir::new().unwrap();
        let outcome = service(root.path())
            .accept(upload("c.png", "image/png", png(10, 10)), Collection::Categories)
            .unwrap();
        assert!(outcome.url.starts_with("/images/categories/"));
        assert!(root.path().join("images/categories").is_dir());
    }

    #[test]
    fn test_no_file_is_client_error() {
        let root = TempDir::new().unwrap();
        let err = service(root.path()).accept(None, Collection::Products).unwrap_err();
        assert!(matches!(err, VariantError::NoFileProvided));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_rejects_unsupported_content_type() {
        let root = TempDir::new().unwrap();
        let err = service(root.path())
            .accept(upload("a.bmp", "image/bmp", png(4, 4)), Collection::Products)
            .unwrap_err();
        assert!(matches!(err, VariantError::UnsupportedFormat(_)));
        assert!(!root.path().join("images").exists());
    }

    #[test]
    fn test_rejects_mislabelled_bytes() {
        let root = TempDir::new().unwrap();
        let err = service(root.path())
            .accept(
                upload("a.jpg", "image/jpeg", b"plain text pretending".to_vec()),
                Collection::Products,
            )
            .unwrap_err();
        assert!(matches!(err, VariantError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_corrupt_image_stores_nothing() {
        let root = TempDir::new().unwrap();
        let err = service(root.path())
            .accept(
                upload("a.png", "image/png", b"\x89PNG\r\n\x1a\ntruncated".to_vec()),
                Collection::Products,
            )
            .unwrap_err();
        assert!(matches!(err, VariantError::Decode(_)));
        assert!(!root.path().join("images").exists());
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let root = TempDir::new().unwrap();
        let settings = Settings {
            public_root: root.path().to_path_buf(),
            max_upload_bytes: 16,
            ..Settings::default()
        };
        let svc = UploadService::new(VariantGenerator::new(FsStore), settings);
        let err = svc
            .accept(upload("a.png", "image/png", png(8, 8)), Collection::Products)
            .unwrap_err();
        assert!(matches!(err, VariantError::FileTooLarge { limit: 16, .. }));
        assert_eq!(err.status_code(), 413);
    }

    #[test]
    fn test_source_extension_falls_back_to_content_type() {
        let file = UploadedFile {
            file_name: "blob".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: Vec::new(),
        };
        assert_eq!(source_extension(&file).unwrap(), "jpg");

        let file = UploadedFile {
            file_name: "photo.JPEG".to_string(),
            ..file
        };
        assert_eq!(source_extension(&file).unwrap(), "jpeg");
    }

    #[test]
    fn test_collection_from_form_value() {
        assert_eq!(Collection::from_form_value("category"), Collection::Categories);
        assert_eq!(Collection::from_form_value("product"), Collection::Products);
        assert_eq!(Collection::from_form_value(""), Collection::Products);
    }
}
