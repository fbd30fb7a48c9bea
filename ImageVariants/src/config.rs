//! Process configuration
//!
//! Read from the environment; any missing or malformed value falls back to
//! its default.
//!
//! | Variable                          | Default                                   |
//! |-----------------------------------|-------------------------------------------|
//! | `IMAGE_VARIANTS_PUBLIC_ROOT`      | `public`                                  |
//! | `IMAGE_VARIANTS_NAMESPACE`        | `images`                                  |
//! | `IMAGE_VARIANTS_MAX_UPLOAD_BYTES` | 5 MiB                                     |
//! | `IMAGE_VARIANTS_SCAN_DIRS`        | products, categories and the images root  |

use std::ffi::OsString;
use std::path::PathBuf;

pub const PUBLIC_ROOT_VAR: &str = "IMAGE_VARIANTS_PUBLIC_ROOT";
pub const NAMESPACE_VAR: &str = "IMAGE_VARIANTS_NAMESPACE";
pub const MAX_UPLOAD_BYTES_VAR: &str = "IMAGE_VARIANTS_MAX_UPLOAD_BYTES";
pub const SCAN_DIRS_VAR: &str = "IMAGE_VARIANTS_SCAN_DIRS";

/// Upload limit used when none is configured
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory that public URLs are served from
    pub public_root: PathBuf,
    /// First URL segment under the public root
    pub namespace: String,
    /// Largest accepted upload
    pub max_upload_bytes: usize,
    /// Directories visited by the batch tool
    pub scan_dirs: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let public_root = PathBuf::from("public");
        let namespace = "images".to_string();
        let scan_dirs = default_scan_dirs(&public_root, &namespace);
        Self {
            public_root,
            namespace,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            scan_dirs,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<OsString>,
    {
        let defaults = Self::default();

        let public_root = lookup(PUBLIC_ROOT_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| defaults.public_root.clone());

        let namespace = match lookup(NAMESPACE_VAR).map(|v| v.into_string()) {
            Some(Ok(ns)) if !ns.trim_matches('/').is_empty() => ns.trim_matches('/').to_string(),
            Some(_) => {
                tracing::debug!("Ignoring invalid {}, using default", NAMESPACE_VAR);
                defaults.namespace.clone()
            }
            None => defaults.namespace.clone(),
        };

        let max_upload_bytes = match lookup(MAX_UPLOAD_BYTES_VAR) {
            Some(raw) => match raw.to_str().and_then(|s| s.trim().parse::<usize>().ok()) {
                Some(limit) if limit > 0 => limit,
                _ => {
                    tracing::debug!(
                        "Failed to parse {}={:?}, defaulting to {} bytes",
                        MAX_UPLOAD_BYTES_VAR,
                        raw,
                        DEFAULT_MAX_UPLOAD_BYTES
                    );
                    DEFAULT_MAX_UPLOAD_BYTES
                }
            },
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let scan_dirs = lookup(SCAN_DIRS_VAR)
            .map(|raw| {
                std::env::split_paths(&raw)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|dirs| !dirs.is_empty())
            .unwrap_or_else(|| default_scan_dirs(&public_root, &namespace));

        Self {
            public_root,
            namespace,
            max_upload_bytes,
            scan_dirs,
        }
    }

    /// Filesystem directory for a collection subdirectory
    pub fn collection_dir(&self, sub_dir: &str) -> PathBuf {
        self.public_root.join(&self.namespace).join(sub_dir)
    }

    /// URL prefix for a collection subdirectory, e.g. `/images/products`
    pub fn collection_url(&self, sub_dir: &str) -> String {
        format!("/{}/{}", self.namespace, sub_dir)
    }
}

fn default_scan_dirs(public_root: &std::path::Path, namespace: &str) -> Vec<PathBuf> {
    let images = public_root.join(namespace);
    vec![images.join("products"), images.join("categories"), images]
}
