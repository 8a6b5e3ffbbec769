//! File classification
//!
//! Walks a repository root and gives every regular file exactly one
//! [`Disposition`]. Precedence, first match wins:
//!
//! 1. path inside a `.git` directory -> `SkipIgnored`
//! 2. size above the threshold -> `SkipOversize`
//! 3. known binary extension -> `SkipBinary`
//! 4. otherwise -> `Include`
//!
//! The walk does not honour `.gitignore` or hidden-file conventions: every
//! regular file is recorded. Symlinks are neither followed nor recorded.

use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Component, Path};

use crate::error::{EngineError, Result};
use crate::types::{display_name, extension_of, Disposition, FileRecord};
use crate::DEFAULT_MAX_BYTES;

/// Name of the version-control metadata directory
pub const VCS_DIR: &str = ".git";

/// Extensions that are never rendered
pub const BINARY_EXTENSIONS: &[&str] = &[
    // Executables and compiled objects
    "exe", "dll", "so", "dylib", "a", "o", "obj", "lib", "wasm", "pyc", "pyo", "class", "jar",
    "war", "ear",
    // Archives
    "zip", "tar", "gz", "bz2", "xz", "7z", "rar", "tgz", "zst",
    // Images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svg", "tiff", "psd",
    // Audio/Video
    "mp3", "mp4", "avi", "mov", "wav", "flac", "ogg", "webm", "mkv",
    // Documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt",
    // Fonts
    "woff", "woff2", "ttf", "eot", "otf",
    // Database
    "db", "sqlite", "sqlite3",
    // Misc binary
    "bin", "dat", "pkl", "npy",
];

/// Classifies the files of one repository snapshot
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Files strictly larger than this are `SkipOversize`
    max_bytes: u64,
    /// Lowercased binary extensions (built-in set plus configured extras)
    binary_extensions: HashSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

impl Classifier {
    /// Create a classifier with the built-in binary extension set
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            binary_extensions: BINARY_EXTENSIONS.iter().map(|e| (*e).to_owned()).collect(),
        }
    }

    /// Add extra binary extensions (leading dots and case are ignored)
    pub fn with_binary_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.binary_extensions.extend(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase()),
        );
        self
    }

    /// Byte threshold in use
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Decide the disposition of a single file
    pub fn disposition(&self, relative_path: &str, path: &Path, size_bytes: u64) -> Disposition {
        if is_vcs_path(relative_path) {
            Disposition::SkipIgnored
        } else if size_bytes > self.max_bytes {
            Disposition::SkipOversize
        } else if self.is_binary_extension(path) {
            Disposition::SkipBinary
        } else {
            Disposition::Include
        }
    }

    /// Check if file has a binary extension
    pub fn is_binary_extension(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.binary_extensions.contains(&ext))
    }

    /// Walk `root` and classify every regular file, in discovery order.
    ///
    /// Discovery order is depth-first with entries of each directory sorted by
    /// file name. Only root access and enumeration failures are returned as
    /// errors; an unreadable file size becomes 0.
    pub fn classify(&self, root: &Path) -> Result<Vec<FileRecord>> {
        check_root(root)?;

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut records = Vec::new();

        for entry in walker {
            let entry = entry?;

            let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
            if !is_file {
                continue;
            }

            let entry_path = entry.path();
            let size_bytes = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    log::warn!("Cannot stat {}: {}", entry_path.display(), e);
                    0
                },
            };

            let relative_path = relative_path(root, entry_path);
            let disposition = self.disposition(&relative_path, entry_path, size_bytes);
            log::debug!("{} -> {} ({} bytes)", relative_path, disposition.name(), size_bytes);

            records.push(FileRecord {
                path: entry_path.to_path_buf(),
                relative_path,
                size_bytes,
                disposition,
            });
        }

        log::info!("Classified {} files under {}", records.len(), root.display());
        Ok(records)
    }
}

/// Classify every regular file under `root` with the default binary set
pub fn classify(root: &Path, max_bytes: u64) -> Result<Vec<FileRecord>> {
    Classifier::new(max_bytes).classify(root)
}

/// Fail unless `root` exists and is a directory we can list
pub(crate) fn check_root(root: &Path) -> Result<()> {
    let unreadable = |reason: String| EngineError::RootUnreadable {
        path: root.to_path_buf(),
        reason,
    };

    let meta = std::fs::metadata(root).map_err(|e| unreadable(e.to_string()))?;
    if !meta.is_dir() {
        return Err(unreadable("not a directory".to_owned()));
    }
    std::fs::read_dir(root).map_err(|e| unreadable(e.to_string()))?;
    Ok(())
}

/// Whether a `/`-separated relative path lies inside version-control metadata
pub fn is_vcs_path(relative_path: &str) -> bool {
    relative_path.split('/').any(|part| part == VCS_DIR)
}

/// Path relative to `root`, joined with `/` on every platform
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(display_name(part)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
