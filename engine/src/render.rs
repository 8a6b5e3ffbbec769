//! Per-file content rendering
//!
//! Markdown-family files are rendered to HTML with pulldown-cmark; every other
//! included file goes through a [`Highlighter`], by default the tree-sitter
//! [`SyntaxHighlighter`]. A failure for one file is
//! returned as that file's `Err` body and never stops the run.

use pulldown_cmark::{html, Options, Parser};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;

use crate::error::RenderError;
use crate::highlight::SyntaxHighlighter;
use crate::output::escape_html;
use crate::types::{extension_of, FileRecord, RenderedSection};

/// Extensions rendered as prose
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

/// Source-to-markup transformer for non-markdown files.
///
/// Implementations must be stateless across files; the renderer calls them
/// from several threads at once.
pub trait Highlighter: Send + Sync {
    /// Turn decoded source text into an HTML fragment
    fn highlight(&self, source: &str, path: &Path) -> Result<String, RenderError>;

    /// Get highlighter name
    fn name(&self) -> &'static str;
}

/// Plain highlighter: escapes the source and tags it with a
/// `language-<name>` class, without per-token markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassHighlighter;

impl Highlighter for ClassHighlighter {
    fn highlight(&self, source: &str, path: &Path) -> Result<String, RenderError> {
        let language = detect_language(path).unwrap_or("plaintext");
        let mut out = String::with_capacity(source.len() + source.len() / 8 + 96);
        out.push_str("<div class=\"highlight\"><pre><code class=\"language-");
        out.push_str(language);
        out.push_str("\">");
        out.push_str(&escape_html(source));
        out.push_str("</code></pre></div>");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "plain"
    }
}

/// Renders included files into section bodies
pub struct Renderer {
    markdown_extensions: HashSet<String>,
    highlighter: Box<dyn Highlighter>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with the default highlighter
    pub fn new() -> Self {
        Self::with_highlighter(Box::new(SyntaxHighlighter))
    }

    /// Create a renderer with a custom highlighter
    pub fn with_highlighter(highlighter: Box<dyn Highlighter>) -> Self {
        Self {
            markdown_extensions: MARKDOWN_EXTENSIONS.iter().map(|e| (*e).to_owned()).collect(),
            highlighter,
        }
    }

    /// Add extra markdown extensions (leading dots and case are ignored)
    pub fn with_markdown_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.markdown_extensions.extend(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase()),
        );
        self
    }

    /// Whether a path is rendered as markdown
    pub fn is_markdown(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.markdown_extensions.contains(&ext))
    }

    /// Render one file. Disposition is not re-checked.
    pub fn render(&self, record: &FileRecord) -> RenderedSection {
        let body = self.render_body(&record.path);
        if let Err(e) = &body {
            log::warn!("Rendering {} failed: {}", record.relative_path, e);
        }

        RenderedSection {
            anchor_id: record.anchor_id(),
            relative_path: record.relative_path.clone(),
            size_bytes: record.size_bytes,
            body,
        }
    }

    /// Render every included record, in parallel, preserving discovery order
    pub fn render_all(&self, records: &[FileRecord]) -> Vec<RenderedSection> {
        records
            .par_iter()
            .filter(|r| r.disposition.is_included())
            .map(|r| self.render(r))
            .collect()
    }

    fn render_body(&self, path: &Path) -> Result<String, RenderError> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes)?;

        if self.is_markdown(path) {
            Ok(render_markdown(&text))
        } else {
            self.highlighter.highlight(&text, path)
        }
    }
}

/// Render markdown to an HTML fragment wrapped in `div.markdown-body`
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 3 / 2 + 32);
    out.push_str("<div class=\"markdown-body\">");
    html::push_html(&mut out, parser);
    out.push_str("</div>");
    out
}

/// Detect language class from file name or extension
pub fn detect_language(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    match name {
        "Makefile" | "GNUmakefile" => return Some("makefile"),
        "Dockerfile" | "Containerfile" => return Some("dockerfile"),
        "CMakeLists.txt" => return Some("cmake"),
        "Gemfile" | "Rakefile" => return Some("ruby"),
        _ => {},
    }

    let lang = match extension_of(path)?.as_str() {
        "py" | "pyi" | "pyx" => "python",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "mts" | "cts" | "tsx" => "typescript",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "clj" | "cljs" | "cljc" => "clojure",
        "c" | "h" => "c",
        "cpp" | "hpp" | "cc" | "cxx" | "hxx" => "cpp",
        "cs" => "csharp",
        "rb" | "rake" | "gemspec" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "sh" | "bash" | "zsh" => "bash",
        "ps1" | "psm1" => "powershell",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" | "sass" => "scss",
        "less" => "less",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "xml" => "xml",
        "ini" | "cfg" => "ini",
        "sql" => "sql",
        "lua" => "lua",
        "zig" => "zig",
        "ex" | "exs" => "elixir",
        "erl" | "hrl" => "erlang",
        "hs" | "lhs" => "haskell",
        "ml" | "mli" => "ocaml",
        "fs" | "fsi" | "fsx" => "fsharp",
        "tf" | "tfvars" => "hcl",
        "nix" => "nix",
        "jl" => "julia",
        "r" => "r",
        "dart" => "dart",
        "vue" => "xml",
        "txt" | "rst" => "plaintext",
        _ => return None,
    };

    Some(lang)
}
