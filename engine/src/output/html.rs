//! Single-page HTML output
//!
//! The page carries both views of one document: the human view (tree, table
//! of contents, skip lists, rendered sections) and the machine view in a
//! read-only text area, with buttons to switch between them.

use std::fmt::Write;

use crate::document::DocumentModel;
use crate::error::Result;
use crate::output::{escape_html, human_size, Formatter};
use crate::types::FileRecord;

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; line-height: 1.5; color: #1f2328; }
.page { max-width: 1100px; margin: 0 auto; padding: 0 1.5rem 3rem; }
header.meta { border-bottom: 1px solid #d0d7de; padding: 1rem 0; }
header.meta .rev, header.meta .counts { color: #59636e; font-size: 0.9rem; }
.toggle { margin: 1rem 0; }
.toggle button { border: 1px solid #d0d7de; background: #f6f8fa; padding: 0.3rem 0.9rem; cursor: pointer; }
.toggle button.active { background: #0969da; color: #fff; border-color: #0969da; }
pre.tree, .highlight pre { background: #f6f8fa; padding: 0.75rem; overflow: auto; font-size: 0.85rem; }
.hl-keyword, .hl-operator { color: #cf222e; }
.hl-string, .hl-string-special, .hl-escape { color: #0a3069; }
.hl-comment { color: #6e7781; font-style: italic; }
.hl-function, .hl-function-method, .hl-function-builtin, .hl-constructor { color: #8250df; }
.hl-type, .hl-type-builtin, .hl-module { color: #953800; }
.hl-number, .hl-constant, .hl-constant-builtin, .hl-variable-builtin { color: #0550ae; }
.hl-attribute, .hl-label, .hl-tag, .hl-property { color: #116329; }
.toc li span, .skip li span, .file-section h2 span { color: #59636e; font-size: 0.85rem; margin-left: 0.5rem; }
.file-section { border-top: 1px solid #d0d7de; margin-top: 2rem; padding-top: 0.5rem; }
.file-section h2 { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size: 1rem; }
.render-error { background: #ffebe9; border: 1px solid #ff818266; padding: 0.75rem; color: #82071e; }
.back-top { font-size: 0.85rem; }
#machine-view textarea { width: 100%; height: 80vh; font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size: 0.8rem; }
"#;

const SCRIPT: &str = r#"
function showView(name) {
  document.getElementById('human-view').hidden = name !== 'human';
  document.getElementById('machine-view').hidden = name !== 'machine';
  document.getElementById('show-human').classList.toggle('active', name === 'human');
  document.getElementById('show-machine').classList.toggle('active', name === 'machine');
}
"#;

/// HTML page formatter
pub struct HtmlFormatter {
    /// Embed the stylesheet
    embed_style: bool,
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlFormatter {
    /// Create a new HTML formatter
    pub fn new() -> Self {
        Self { embed_style: true }
    }

    /// Set stylesheet option
    pub fn with_style(mut self, enabled: bool) -> Self {
        self.embed_style = enabled;
        self
    }

    fn write_head(&self, output: &mut String, doc: &DocumentModel) {
        writeln!(output, "<!DOCTYPE html>").unwrap();
        writeln!(output, "<html lang=\"en\">").unwrap();
        writeln!(output, "<head>").unwrap();
        writeln!(output, "<meta charset=\"utf-8\">").unwrap();
        writeln!(output, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")
            .unwrap();
        writeln!(output, "<title>{}</title>", escape_html(&doc.locator)).unwrap();
        if self.embed_style {
            writeln!(output, "<style>{}</style>", STYLE).unwrap();
        }
        writeln!(output, "<script>{}</script>", SCRIPT).unwrap();
        writeln!(output, "</head>").unwrap();
    }

    fn write_header(&self, output: &mut String, doc: &DocumentModel) {
        let stats = doc.stats();

        writeln!(output, "<header class=\"meta\" id=\"top\">").unwrap();
        writeln!(output, "<h1>{}</h1>", escape_html(&doc.locator)).unwrap();
        writeln!(output, "<div class=\"rev\">Revision: <code>{}</code></div>", escape_html(&doc.revision))
            .unwrap();
        writeln!(
            output,
            "<div class=\"counts\">Total files: {} · Rendered: {} · Skipped: {}</div>",
            stats.total_files, stats.rendered, stats.skipped
        )
        .unwrap();
        writeln!(output, "</header>").unwrap();

        writeln!(output, "<nav class=\"toggle\">").unwrap();
        writeln!(
            output,
            "<button id=\"show-human\" class=\"active\" onclick=\"showView('human')\">Human</button>"
        )
        .unwrap();
        writeln!(output, "<button id=\"show-machine\" onclick=\"showView('machine')\">LLM</button>")
            .unwrap();
        writeln!(output, "</nav>").unwrap();
    }

    fn write_tree(&self, output: &mut String, doc: &DocumentModel) {
        writeln!(output, "<section class=\"tree\">").unwrap();
        writeln!(output, "<h2>Directory tree</h2>").unwrap();
        writeln!(output, "<pre class=\"tree\">{}</pre>", escape_html(&doc.directory_tree)).unwrap();
        writeln!(output, "</section>").unwrap();
    }

    fn write_toc(&self, output: &mut String, doc: &DocumentModel) {
        let toc = doc.toc();

        writeln!(output, "<section class=\"toc\">").unwrap();
        writeln!(output, "<h2>Contents ({})</h2>", toc.len()).unwrap();
        writeln!(output, "<ul>").unwrap();
        for entry in &toc {
            writeln!(
                output,
                "<li><a href=\"#file-{}\">{}</a><span>{}</span></li>",
                entry.anchor_id,
                escape_html(&entry.relative_path),
                human_size(entry.size_bytes)
            )
            .unwrap();
        }
        writeln!(output, "</ul>").unwrap();
        writeln!(output, "</section>").unwrap();
    }

    fn write_skip_list(&self, output: &mut String, title: &str, class: &str, records: &[&FileRecord]) {
        if records.is_empty() {
            return;
        }

        writeln!(output, "<section class=\"skip {}\">", class).unwrap();
        writeln!(output, "<h2>{} ({})</h2>", title, records.len()).unwrap();
        writeln!(output, "<ul>").unwrap();
        for record in records {
            writeln!(
                output,
                "<li><code>{}</code><span>{}</span></li>",
                escape_html(&record.relative_path),
                human_size(record.size_bytes)
            )
            .unwrap();
        }
        writeln!(output, "</ul>").unwrap();
        writeln!(output, "</section>").unwrap();
    }

    fn write_sections(&self, output: &mut String, doc: &DocumentModel) {
        for section in &doc.sections {
            writeln!(output, "<section class=\"file-section\" id=\"file-{}\">", section.anchor_id)
                .unwrap();
            writeln!(
                output,
                "<h2>{}<span>{}</span></h2>",
                escape_html(&section.relative_path),
                human_size(section.size_bytes)
            )
            .unwrap();

            match &section.body {
                Ok(markup) => {
                    output.push_str(markup);
                    output.push('\n');
                },
                Err(e) => {
                    writeln!(
                        output,
                        "<pre class=\"render-error\">Failed to render: {}</pre>",
                        escape_html(&e.to_string())
                    )
                    .unwrap();
                },
            }

            writeln!(output, "<p class=\"back-top\"><a href=\"#top\">Back to top</a></p>").unwrap();
            writeln!(output, "</section>").unwrap();
        }
    }

    fn write_machine_view(&self, output: &mut String, doc: &DocumentModel) {
        writeln!(output, "<main id=\"machine-view\" hidden>").unwrap();
        writeln!(output, "<h2>LLM view</h2>").unwrap();
        writeln!(output, "<textarea readonly spellcheck=\"false\">{}</textarea>", escape_html(&doc.machine_view))
            .unwrap();
        writeln!(output, "</main>").unwrap();
    }
}

impl Formatter for HtmlFormatter {
    fn format(&self, doc: &DocumentModel) -> Result<String> {
        let mut output = String::with_capacity(
            doc.machine_view.len() * 2
                + doc.sections.iter().filter_map(|s| s.body.as_ref().ok()).map(String::len).sum::<usize>()
                + 8192,
        );

        self.write_head(&mut output, doc);
        writeln!(output, "<body>").unwrap();
        writeln!(output, "<div class=\"page\">").unwrap();
        self.write_header(&mut output, doc);

        writeln!(output, "<main id=\"human-view\">").unwrap();
        self.write_tree(&mut output, doc);
        self.write_toc(&mut output, doc);
        self.write_skip_list(&mut output, "Skipped binaries", "binary", &doc.skipped_binary());
        self.write_skip_list(&mut output, "Skipped large files", "oversize", &doc.skipped_oversize());
        self.write_sections(&mut output, doc);
        writeln!(output, "</main>").unwrap();

        self.write_machine_view(&mut output, doc);

        writeln!(output, "</div>").unwrap();
        writeln!(output, "</body>").unwrap();
        writeln!(output, "</html>").unwrap();

        Ok(output)
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

#[cfg(test)]
#[allow(clippy::str_to_string)]
mod tests {
    use super::*;
    use crate::output::tests::create_test_document;

    #[test]
    fn test_html_page_structure() {
        let doc = create_test_document();
        let output = HtmlFormatter::new().format(&doc).unwrap();

        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("<title>https://github.com/octo/hello</title>"));
        assert!(output.contains("Revision: <code>0123abcd</code>"));
        assert!(output.contains("Total files: 6 · Rendered: 3 · Skipped: 3"));
        assert!(output.contains("<style>"));
        assert!(output.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_toc_links_to_sections_in_order() {
        let doc = create_test_document();
        let output = HtmlFormatter::new().format(&doc).unwrap();

        let readme = output.find("<a href=\"#file-README-md\">README.md</a>").unwrap();
        let main = output.find("<a href=\"#file-src-main-rs\">src/main.rs</a>").unwrap();
        assert!(readme < main);
        assert!(output.contains("<section class=\"file-section\" id=\"file-README-md\">"));
        assert_eq!(output.matches("<a href=\"#top\">Back to top</a>").count(), 3);
    }

    #[test]
    fn test_skip_lists_hide_ignored() {
        let doc = create_test_document();
        let output = HtmlFormatter::new().format(&doc).unwrap();

        assert!(output.contains("Skipped binaries (1)"));
        assert!(output.contains("<code>main.bin</code>"));
        assert!(output.contains("Skipped large files (1)"));
        assert!(output.contains("<code>big.txt</code>"));
        assert!(!output.contains(".git/config"));
    }

    #[test]
    fn test_render_error_placeholder() {
        let doc = create_test_document();
        let output = HtmlFormatter::new().format(&doc).unwrap();
        assert!(output.contains("<pre class=\"render-error\">Failed to render: File is not valid UTF-8"));
    }

    #[test]
    fn test_machine_view_is_escaped_in_textarea() {
        let doc = create_test_document();
        let output = HtmlFormatter::new().format(&doc).unwrap();
        assert!(output.contains("<textarea readonly spellcheck=\"false\">&lt;documents&gt;"));
    }

    #[test]
    fn test_without_style() {
        let doc = create_test_document();
        let output = HtmlFormatter::new().with_style(false).format(&doc).unwrap();
        assert!(!output.contains("<style>"));
    }
}
