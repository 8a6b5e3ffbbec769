//! Directory tree text
//!
//! A separate filesystem pass from classification: entries are listed
//! directories first, then files, each group sorted by lowercased name. The
//! `.git` directory is left out and symlinks are shown but never descended.

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use crate::classify::{check_root, VCS_DIR};
use crate::error::Result;
use crate::types::display_name;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

struct TreeEntry {
    name: String,
    os_name: OsString,
    is_dir: bool,
}

/// Render the directory tree under `root` with box-drawing connectors.
///
/// The first line is `.`; the text ends with a newline.
pub fn directory_tree(root: &Path) -> Result<String> {
    check_root(root)?;

    let mut output = String::from(".\n");
    write_level(root, "", &mut output)?;
    Ok(output)
}

fn write_level(dir: &Path, prefix: &str, output: &mut String) -> Result<()> {
    let entries = sorted_entries(dir)?;
    let count = entries.len();

    for (i, entry) in entries.into_iter().enumerate() {
        let is_last = i + 1 == count;
        output.push_str(prefix);
        output.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        output.push_str(&entry.name);
        output.push('\n');

        if entry.is_dir {
            let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
            write_level(&dir.join(&entry.os_name), &child_prefix, output)?;
        }
    }

    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let os_name = entry.file_name();
        let name = display_name(&os_name);
        if name == VCS_DIR {
            continue;
        }
        // file_type() does not follow symlinks, so a link to a directory is a leaf
        let is_dir = entry.file_type()?.is_dir();
        entries.push(TreeEntry { name, os_name, is_dir });
    }

    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(entries)
}
