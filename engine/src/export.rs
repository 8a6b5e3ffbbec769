//! Machine view: tag-delimited concatenation of raw file text
//!
//! Content is re-read from disk here rather than taken from the rendered
//! sections, so a rendering problem cannot leak into the export.

use rayon::prelude::*;
use std::fmt::Write;

use crate::types::FileRecord;

/// Build the `<documents>` export for every included record, in order.
///
/// ```text
/// <documents>
/// <document index="1">
/// <source>README.md</source>
/// <document_content>
/// # Hello
/// </document_content>
/// </document>
/// </documents>
/// ```
pub fn machine_view(records: &[FileRecord]) -> String {
    let included: Vec<&FileRecord> =
        records.iter().filter(|r| r.disposition.is_included()).collect();

    let contents: Vec<String> = included.par_iter().map(|r| raw_text(r)).collect();

    let mut output = String::with_capacity(contents.iter().map(|c| c.len() + 96).sum::<usize>() + 24);
    output.push_str("<documents>");

    for (index, (record, content)) in included.iter().zip(&contents).enumerate() {
        write!(
            output,
            "\n<document index=\"{}\">\n<source>{}</source>\n<document_content>\n{}\n</document_content>\n</document>",
            index + 1,
            record.relative_path,
            content
        )
        .unwrap();
    }

    output.push_str("\n</documents>");
    output
}

/// Raw text of a file, or a failure message in its place
fn raw_text(record: &FileRecord) -> String {
    match std::fs::read(&record.path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            log::warn!("Raw read of {} failed: {}", record.relative_path, e);
            format!("Failed to read: {}", e)
        },
    }
}
