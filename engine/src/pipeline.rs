//! One run over a local tree: classify, render, assemble
//!
//! Rendering, the directory tree and the machine view only read the
//! filesystem, so they run concurrently once classification is done.

use rayon::ThreadPoolBuilder;
use std::path::Path;

use crate::classify::Classifier;
use crate::config::Config;
use crate::document::{Assembler, DocumentModel};
use crate::error::{EngineError, Result};
use crate::export::machine_view;
use crate::render::Renderer;
use crate::tree::directory_tree;
use crate::DEFAULT_MAX_BYTES;

/// Knobs for a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Files larger than this are skipped as oversize
    pub max_bytes: u64,
    /// Worker threads (0 = rayon's global pool)
    pub threads: usize,
    pub extra_binary_extensions: Vec<String>,
    pub extra_markdown_extensions: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            threads: 0,
            extra_binary_extensions: Vec::new(),
            extra_markdown_extensions: Vec::new(),
        }
    }
}

impl PipelineOptions {
    /// Reject settings no run can honor
    pub fn validate(&self) -> Result<()> {
        if self.max_bytes == 0 {
            return Err(EngineError::InvalidSetting("max_bytes must be at least 1".to_owned()));
        }
        Ok(())
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_bytes: config.max_bytes,
            threads: config.threads,
            extra_binary_extensions: config.extra_binary_extensions.clone(),
            extra_markdown_extensions: config.extra_markdown_extensions.clone(),
        }
    }
}

/// Build the document for the tree at `root`.
///
/// `locator` is only used for display; `revision` may be empty.
pub fn build_document(
    root: &Path,
    locator: &str,
    revision: &str,
    options: &PipelineOptions,
) -> Result<DocumentModel> {
    options.validate()?;
    if options.threads > 0 {
        let pool = ThreadPoolBuilder::new().num_threads(options.threads).build()?;
        pool.install(|| run(root, locator, revision, options))
    } else {
        run(root, locator, revision, options)
    }
}

fn run(root: &Path, locator: &str, revision: &str, options: &PipelineOptions) -> Result<DocumentModel> {
    let classifier =
        Classifier::new(options.max_bytes).with_binary_extensions(&options.extra_binary_extensions);
    let records = classifier.classify(root)?;

    let renderer = Renderer::new().with_markdown_extensions(&options.extra_markdown_extensions);

    let (sections, (tree, export)) = rayon::join(
        || renderer.render_all(&records),
        || rayon::join(|| directory_tree(root), || machine_view(&records)),
    );
    let tree = tree?;

    Ok(Assembler::new(locator, revision).assemble(records, sections, tree, export))
}
