//! Document assembly
//!
//! Combines classifier records, rendered sections, the directory tree and the
//! machine view into one immutable [`DocumentModel`].

use serde::Serialize;
use std::collections::{HashMap, VecDeque};

use crate::types::{Disposition, DocumentStats, FileRecord, RenderedSection, TocEntry};

/// Revision shown when acquisition could not determine one
pub const UNKNOWN_REVISION: &str = "(unknown)";

/// The assembled document for one repository snapshot
#[derive(Debug, Clone, Serialize)]
pub struct DocumentModel {
    /// Original repository reference, display only
    pub locator: String,
    /// Revision identifier or [`UNKNOWN_REVISION`]
    pub revision: String,
    /// Every record, in discovery order
    pub records: Vec<FileRecord>,
    /// One section per included record, in discovery order
    pub sections: Vec<RenderedSection>,
    /// Directory tree text
    pub directory_tree: String,
    /// Tag-delimited raw-text export
    pub machine_view: String,
}

impl DocumentModel {
    /// Table of contents: included files in discovery order
    pub fn toc(&self) -> Vec<TocEntry> {
        self.records_with(Disposition::Include)
            .map(|r| TocEntry {
                anchor_id: r.anchor_id(),
                relative_path: r.relative_path.clone(),
                size_bytes: r.size_bytes,
            })
            .collect()
    }

    /// Files skipped for a binary extension
    pub fn skipped_binary(&self) -> Vec<&FileRecord> {
        self.records_with(Disposition::SkipBinary).collect()
    }

    /// Files skipped for size
    pub fn skipped_oversize(&self) -> Vec<&FileRecord> {
        self.records_with(Disposition::SkipOversize).collect()
    }

    /// Files inside version-control metadata (not shown in the human view)
    pub fn skipped_ignored(&self) -> Vec<&FileRecord> {
        self.records_with(Disposition::SkipIgnored).collect()
    }

    /// Counts derived from the record partition
    pub fn stats(&self) -> DocumentStats {
        DocumentStats::from_records(&self.records)
    }

    fn records_with(&self, disposition: Disposition) -> impl Iterator<Item = &FileRecord> + '_ {
        self.records
            .iter()
            .filter(move |r| r.disposition == disposition)
    }
}

/// Builds a [`DocumentModel`] for one locator/revision pair
#[derive(Debug, Clone)]
pub struct Assembler {
    locator: String,
    revision: String,
}

impl Assembler {
    /// Create an assembler. An empty revision becomes [`UNKNOWN_REVISION`].
    pub fn new(locator: impl Into<String>, revision: impl Into<String>) -> Self {
        let revision = revision.into();
        let revision = if revision.trim().is_empty() {
            UNKNOWN_REVISION.to_owned()
        } else {
            revision
        };
        Self { locator: locator.into(), revision }
    }

    /// Assemble the document.
    ///
    /// Sections are re-ordered to follow the records' discovery order, so
    /// they may arrive in any order. Sections sharing a relative path are
    /// matched to their records in arrival order. Sections without a matching
    /// included record are dropped.
    pub fn assemble(
        &self,
        records: Vec<FileRecord>,
        sections: Vec<RenderedSection>,
        directory_tree: String,
        machine_view: String,
    ) -> DocumentModel {
        let mut by_path: HashMap<String, VecDeque<RenderedSection>> = HashMap::new();
        for section in sections {
            by_path
                .entry(section.relative_path.clone())
                .or_default()
                .push_back(section);
        }

        let sections: Vec<RenderedSection> = records
            .iter()
            .filter(|r| r.disposition.is_included())
            .filter_map(|r| by_path.get_mut(&r.relative_path).and_then(VecDeque::pop_front))
            .collect();

        let orphans: usize = by_path.values().map(VecDeque::len).sum();
        if orphans > 0 {
            log::warn!("Dropped {} sections with no included record", orphans);
        }

        let doc = DocumentModel {
            locator: self.locator.clone(),
            revision: self.revision.clone(),
            records,
            sections,
            directory_tree,
            machine_view,
        };

        let stats = doc.stats();
        log::info!(
            "Assembled {}: {} files, {} rendered, {} skipped",
            doc.locator,
            stats.total_files,
            stats.rendered,
            stats.skipped
        );

        doc
    }
}
