//! Server-side syntax highlighting with tree-sitter
//!
//! Each token becomes a `<span class="hl-...">` so the page is coloured
//! without any client-side script. Languages without a bundled grammar fall
//! back to escaped plain text in the same wrapper.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use tree_sitter::Language;
use tree_sitter_highlight::{
    Highlight, HighlightConfiguration, Highlighter as TsHighlighter, HtmlRenderer,
};

use crate::error::RenderError;
use crate::render::{detect_language, ClassHighlighter, Highlighter};

/// Capture names recognised in grammar queries. Each maps to a
/// `hl-<name>` class with dots replaced by dashes.
pub const HIGHLIGHT_NAMES: &[&str] = &[
    "attribute",
    "comment",
    "constant",
    "constant.builtin",
    "constructor",
    "embedded",
    "escape",
    "function",
    "function.builtin",
    "function.method",
    "keyword",
    "label",
    "module",
    "number",
    "operator",
    "property",
    "punctuation",
    "punctuation.bracket",
    "punctuation.delimiter",
    "punctuation.special",
    "string",
    "string.special",
    "tag",
    "type",
    "type.builtin",
    "variable",
    "variable.builtin",
    "variable.parameter",
];

struct Registry {
    languages: HashMap<&'static str, HighlightConfiguration>,
    attributes: Vec<String>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let grammars: Vec<(&'static str, Language, String)> = vec![
            ("rust", tree_sitter_rust::language(), tree_sitter_rust::HIGHLIGHT_QUERY.to_owned()),
            ("python", tree_sitter_python::language(), tree_sitter_python::HIGHLIGHT_QUERY.to_owned()),
            (
                "javascript",
                tree_sitter_javascript::language(),
                tree_sitter_javascript::HIGHLIGHT_QUERY.to_owned(),
            ),
            (
                "typescript",
                tree_sitter_typescript::language_typescript(),
                format!(
                    "{}\n{}",
                    tree_sitter_typescript::HIGHLIGHT_QUERY,
                    tree_sitter_javascript::HIGHLIGHT_QUERY
                ),
            ),
            ("go", tree_sitter_go::language(), tree_sitter_go::HIGHLIGHT_QUERY.to_owned()),
            ("c", tree_sitter_c::language(), tree_sitter_c::HIGHLIGHT_QUERY.to_owned()),
            (
                "cpp",
                tree_sitter_cpp::language(),
                format!("{}\n{}", tree_sitter_cpp::HIGHLIGHT_QUERY, tree_sitter_c::HIGHLIGHT_QUERY),
            ),
        ];

        let mut languages = HashMap::new();
        for (name, language, query) in grammars {
            match HighlightConfiguration::new(language, &query, "", "") {
                Ok(mut config) => {
                    config.configure(HIGHLIGHT_NAMES);
                    languages.insert(name, config);
                },
                Err(e) => log::warn!("Highlight query for {} failed to load: {:?}", name, e),
            }
        }
        log::debug!("Loaded {} highlight grammars", languages.len());

        let attributes = HIGHLIGHT_NAMES
            .iter()
            .map(|n| format!("class=\"hl-{}\"", n.replace('.', "-")))
            .collect();

        Registry { languages, attributes }
    })
}

/// Languages with a bundled grammar
pub fn supported_languages() -> Vec<&'static str> {
    let mut names: Vec<_> = registry().languages.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Default highlighter: tree-sitter grammars rendered to classed spans
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxHighlighter;

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, source: &str, path: &Path) -> Result<String, RenderError> {
        let language = detect_language(path);
        let registry = registry();
        let Some(config) = language.and_then(|l| registry.languages.get(l)) else {
            return ClassHighlighter.highlight(source, path);
        };

        let mut highlighter = TsHighlighter::new();
        let events = highlighter
            .highlight(config, source.as_bytes(), None, |_| None)
            .map_err(|e| RenderError::Highlight(format!("{:?}", e)))?;

        let mut renderer = HtmlRenderer::new();
        renderer
            .render(events, source.as_bytes(), &|h: Highlight| {
                registry.attributes.get(h.0).map_or(b"".as_slice(), |a| a.as_bytes())
            })
            .map_err(|e| RenderError::Highlight(format!("{:?}", e)))?;

        let mut out = String::with_capacity(source.len() * 3 + 96);
        out.push_str("<div class=\"highlight\"><pre><code class=\"language-");
        out.push_str(language.unwrap_or("plaintext"));
        out.push_str("\">");
        out.extend(renderer.lines());
        out.push_str("</code></pre></div>");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "tree-sitter"
    }
}
