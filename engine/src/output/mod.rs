//! Output formatters for the assembled document

mod html;

use humansize::{format_size, BINARY};
use serde::{Deserialize, Serialize};

use crate::document::DocumentModel;
use crate::error::Result;

pub use html::HtmlFormatter;

/// Output format type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Single HTML page with human and machine views
    #[default]
    Html,
    /// Machine view only (tag-delimited raw text)
    Llm,
    /// Document model as JSON
    Json,
}

impl OutputFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Llm => "txt",
            Self::Json => "json",
        }
    }
}

/// Output formatter trait
pub trait Formatter {
    /// Serialize a document
    fn format(&self, doc: &DocumentModel) -> Result<String>;

    /// Get format name
    fn name(&self) -> &'static str;
}

/// Output formatter factory
pub struct OutputFormatter;

impl OutputFormatter {
    /// Create the HTML page formatter
    pub fn html() -> HtmlFormatter {
        HtmlFormatter::new()
    }

    /// Create the machine-view formatter
    pub fn llm() -> LlmFormatter {
        LlmFormatter
    }

    /// Create JSON formatter
    pub fn json() -> JsonFormatter {
        JsonFormatter
    }

    /// Create formatter by format type
    pub fn by_format(format: OutputFormat) -> Box<dyn Formatter> {
        Self::by_format_with_options(format, true)
    }

    /// Create formatter by format type with stylesheet option
    pub fn by_format_with_options(format: OutputFormat, embed_style: bool) -> Box<dyn Formatter> {
        match format {
            OutputFormat::Html => Box::new(HtmlFormatter::new().with_style(embed_style)),
            OutputFormat::Llm => Box::new(LlmFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

/// Emits the machine view verbatim
pub struct LlmFormatter;

impl Formatter for LlmFormatter {
    fn format(&self, doc: &DocumentModel) -> Result<String> {
        let mut output = doc.machine_view.clone();
        output.push('\n');
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// JSON formatter
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, doc: &DocumentModel) -> Result<String> {
        #[derive(Serialize)]
        struct Output<'a> {
            #[serde(flatten)]
            document: &'a DocumentModel,
            stats: crate::types::DocumentStats,
        }

        Ok(serde_json::to_string_pretty(&Output { document: doc, stats: doc.stats() })?)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Human-readable byte size (binary units)
pub fn human_size(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Escape HTML special characters (single-pass)
pub(crate) fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + s.len() / 10);

    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }

    result
}
