//! Core type definitions for codescroll

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::RenderError;

/// Classifier verdict for a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Rendered into both views
    Include,
    /// Known binary, media, archive, font or compiled-object extension
    SkipBinary,
    /// Larger than the configured byte threshold
    SkipOversize,
    /// Inside version-control metadata
    SkipIgnored,
}

impl Disposition {
    /// All dispositions
    pub const ALL: [Disposition; 4] =
        [Self::Include, Self::SkipBinary, Self::SkipOversize, Self::SkipIgnored];

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::SkipBinary => "skip_binary",
            Self::SkipOversize => "skip_oversize",
            Self::SkipIgnored => "skip_ignored",
        }
    }

    /// Whether the file is rendered
    pub fn is_included(&self) -> bool {
        matches!(self, Self::Include)
    }
}

/// A single regular file found under the repository root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path to file
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,
    /// Path relative to repository root, always `/`-separated
    pub relative_path: String,
    /// File size in bytes (0 if the file could not be stat'ed)
    pub size_bytes: u64,
    /// Classifier verdict
    pub disposition: Disposition,
}

impl FileRecord {
    /// Create a new file record
    pub fn new(
        path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
        size_bytes: u64,
        disposition: Disposition,
    ) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
            size_bytes,
            disposition,
        }
    }

    /// Get lowercased file extension
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }

    /// Get filename without path
    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// Anchor slug for this file's section
    pub fn anchor_id(&self) -> String {
        slugify(&self.relative_path)
    }
}

/// Rendered body for one included file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    /// Anchor slug derived from the relative path
    pub anchor_id: String,
    /// Relative path of the source file
    pub relative_path: String,
    /// Size of the source file in bytes
    pub size_bytes: u64,
    /// Rendered markup, or the reason rendering failed
    #[serde(serialize_with = "serialize_body")]
    pub body: Result<String, RenderError>,
}

impl RenderedSection {
    /// Whether rendering failed for this file
    pub fn is_error(&self) -> bool {
        self.body.is_err()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum BodyRepr<'a> {
    Markup(&'a str),
    Error(String),
}

fn serialize_body<S>(body: &Result<String, RenderError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match body {
        Ok(markup) => BodyRepr::Markup(markup).serialize(serializer),
        Err(e) => BodyRepr::Error(e.to_string()).serialize(serializer),
    }
}

/// Table-of-contents entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub anchor_id: String,
    pub relative_path: String,
    pub size_bytes: u64,
}

/// Aggregate counts, always derived from the record partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Total number of files
    pub total_files: usize,
    /// Files rendered into both views
    pub rendered: usize,
    /// Files skipped for any reason
    pub skipped: usize,
    pub skipped_binary: usize,
    pub skipped_oversize: usize,
    pub skipped_ignored: usize,
}

impl DocumentStats {
    /// Count dispositions over a record sequence
    pub fn from_records(records: &[FileRecord]) -> Self {
        let count = |d: Disposition| records.iter().filter(|r| r.disposition == d).count();

        let rendered = count(Disposition::Include);
        let skipped_binary = count(Disposition::SkipBinary);
        let skipped_oversize = count(Disposition::SkipOversize);
        let skipped_ignored = count(Disposition::SkipIgnored);
        let skipped = skipped_binary + skipped_oversize + skipped_ignored;

        Self {
            total_files: rendered + skipped,
            rendered,
            skipped,
            skipped_binary,
            skipped_oversize,
            skipped_ignored,
        }
    }
}

/// Text form of a file name component.
///
/// Bytes that are not valid UTF-8 are written as `\xNN`, so two names that
/// differ only in such bytes stay distinct.
pub(crate) fn display_name(name: &OsStr) -> String {
    match name.to_str() {
        Some(s) => s.to_owned(),
        None => escape_invalid_bytes(name),
    }
}

#[cfg(unix)]
fn escape_invalid_bytes(name: &OsStr) -> String {
    use std::fmt::Write;
    use std::os::unix::ffi::OsStrExt;

    let mut out = String::new();
    for chunk in name.as_bytes().utf8_chunks() {
        out.push_str(chunk.valid());
        for byte in chunk.invalid() {
            write!(out, "\\x{:02X}", byte).unwrap();
        }
    }
    out
}

#[cfg(not(unix))]
fn escape_invalid_bytes(name: &OsStr) -> String {
    name.to_string_lossy().into_owned()
}

fn serialize_path_lossy<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

/// Lowercased extension of a path, if any
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Replace every character outside `[A-Za-z0-9_-]` with `-`.
///
/// Distinct paths may map to the same slug (`a/b.rs` and `a-b.rs`); such
/// collisions are kept as-is.
pub fn slugify(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect()
}
