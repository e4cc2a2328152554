//! Directory listings.
//!
//! Children are read fresh on every request. Order is fixed: the parent entry
//! (unless listing the root), then subdirectories, then files, each group
//! sorted by name with plain byte-wise string comparison.

use std::path::Path;
use std::time::SystemTime;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::format::{format_listing_date, format_size};
use crate::fs::FileSystem;
use crate::html;

/// Name of the synthetic parent-navigation entry.
pub const PARENT_NAME: &str = "..";

/// Characters escaped when a name is used as a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_directory: bool,
    pub last_modified: Option<SystemTime>,
    /// `None` for directories
    pub size_bytes: Option<u64>,
}

impl DirectoryEntry {
    pub fn parent() -> Self {
        Self {
            name: PARENT_NAME.to_string(),
            is_directory: true,
            last_modified: None,
            size_bytes: None,
        }
    }

    pub fn is_parent(&self) -> bool {
        self.is_directory && self.name == PARENT_NAME
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    pub entries: Vec<DirectoryEntry>,
    /// `false` when the directory itself could not be enumerated
    pub readable: bool,
}

/// Lists the immediate children of the canonical directory `dir`.
///
/// Children whose metadata cannot be read, or that are neither files nor
/// directories, are skipped. An unreadable directory yields no entries at all.
pub fn list(fs: &dyn FileSystem, dir: &Path, root: &Path) -> DirectoryListing {
    let children = match fs.read_dir(dir) {
        Ok(children) => children,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Directory could not be read");
            return DirectoryListing {
                entries: Vec::new(),
                readable: false,
            };
        }
    };

    let mut directories = Vec::new();
    let mut files = Vec::new();

    for child in children {
        let Some(name) = child.file_name() else {
            continue;
        };
        let name = name.to_string_lossy().into_owned();

        let meta = match fs.metadata(&child) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(path = %child.display(), error = %e, "Skipping entry without metadata");
                continue;
            }
        };

        if meta.is_dir {
            directories.push(DirectoryEntry {
                name,
                is_directory: true,
                last_modified: meta.modified,
                size_bytes: None,
            });
        } else if meta.is_file {
            files.push(DirectoryEntry {
                name,
                is_directory: false,
                last_modified: meta.modified,
                size_bytes: Some(meta.len),
            });
        }
    }

    directories.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let mut entries = Vec::with_capacity(directories.len() + files.len() + 1);
    if dir != root {
        entries.push(DirectoryEntry::parent());
    }
    entries.extend(directories);
    entries.extend(files);

    DirectoryListing {
        entries,
        readable: true,
    }
}

/// Renders the listing page for `request_path` (the decoded path the client asked for).
pub fn render(request_path: &str, listing: &DirectoryListing) -> String {
    let mut content = html::heading(&format!("Index of {request_path}"));

    if !listing.readable {
        content.push_str(&html::paragraph("Directory could not be read"));
        return html::render(html::PAGE_TITLE, &content);
    }

    let base = segments(request_path);
    let rows: Vec<Vec<String>> = listing
        .entries
        .iter()
        .map(|entry| {
            if entry.is_parent() {
                let parent = &base[..base.len().saturating_sub(1)];
                return vec![
                    html::anchor(&href(parent, None), "Parent Directory"),
                    String::new(),
                    String::new(),
                ];
            }

            let modified = entry.last_modified.map(format_listing_date).unwrap_or_default();
            if entry.is_directory {
                vec![
                    html::anchor(&href(&base, Some(&entry.name)), &format!("{}/", entry.name)),
                    modified,
                    "-".to_string(),
                ]
            } else {
                let size = entry.size_bytes.map(format_size).unwrap_or_else(|| "-".to_string());
                let mut link = href(&base, Some(&entry.name));
                link.pop();
                vec![html::anchor(&link, &entry.name), modified, size]
            }
        })
        .collect();

    content.push_str(&html::table(&["Name", "Last Modified", "Size"], &rows));
    html::render(html::PAGE_TITLE, &content)
}

/// Splits a request path into segments with `.` and `..` applied.
fn segments(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out
}

/// Absolute, encoded link to `base/name/` (or `base/` when `name` is `None`).
fn href(base: &[&str], name: Option<&str>) -> String {
    let mut out = String::from("/");
    for segment in base.iter().copied().chain(name) {
        out.extend(utf8_percent_encode(segment, SEGMENT));
        out.push('/');
    }
    out
}
