//! Codescroll Engine - repository snapshots as one navigable document
//!
//! This crate turns a directory tree into a single document with two views:
//!
//! - A human view: directory tree, table of contents, skip lists and one
//!   rendered section per text file (markdown as prose, everything else as
//!   syntax-highlighted source)
//! - A machine view: the raw text of every included file inside
//!   `<documents>` tags, ready to paste into an LLM prompt
//!
//! Remote repositories are shallow-cloned into a temporary directory first,
//! falling back to a GitHub archive download when git is unavailable.
//!
//! # Example
//!
//! ```rust,no_run
//! use codescroll_engine::{build_document, OutputFormatter, PipelineOptions};
//! use codescroll_engine::output::Formatter;
//! use std::path::Path;
//!
//! let doc = build_document(Path::new("."), "local", "", &PipelineOptions::default())?;
//! let html = OutputFormatter::html().format(&doc)?;
//! # Ok::<(), codescroll_engine::EngineError>(())
//! ```

pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod git;
pub mod highlight;
pub mod output;
pub mod pipeline;
pub mod remote;
pub mod render;
pub mod tree;
pub mod types;

pub use classify::{classify, Classifier};
pub use config::{Config, ConfigFileFormat};
pub use document::{Assembler, DocumentModel, UNKNOWN_REVISION};
pub use error::{EngineError, RenderError, Result};
pub use export::machine_view;
pub use git::{revision_of, GitError, GitRepo};
pub use highlight::SyntaxHighlighter;
pub use output::{OutputFormat, OutputFormatter};
pub use pipeline::{build_document, PipelineOptions};
pub use remote::{Acquired, GitProvider, RemoteError, RemoteRepo};
pub use render::{ClassHighlighter, Highlighter, Renderer};
pub use tree::directory_tree;
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default size threshold in bytes (50 KiB)
pub const DEFAULT_MAX_BYTES: u64 = 51_200;
