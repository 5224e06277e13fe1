//! Directory listing.

use std::cmp::Ordering;
use std::fs;

use serde::Serialize;

use super::classify::{TextClassifier, TextHint};
use super::path::PathResolver;
use super::size::format_size;
use crate::{RepoError, Result};

/// Entry kind.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Directory (sorted first).
    Directory,
    /// Regular file.
    File,
}

/// One listed item.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Entry {
    /// Base name.
    pub name: String,
    /// File or directory.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// POSIX path relative to the storage root; directories end with `/`.
    #[serde(rename = "path")]
    pub relative_path: String,
    /// Size in bytes (files only).
    #[serde(rename = "sizeBytes")]
    pub size_bytes: Option<u64>,
    /// Human-readable size (files only).
    #[serde(rename = "size")]
    pub size_display: Option<String>,
    /// Text hint (files only).
    #[serde(rename = "isText", skip_serializing_if = "Option::is_none")]
    pub is_text: Option<TextHint>,
}

impl Entry {
    fn directory(name: String, relative: String) -> Self {
        Self {
            name,
            kind: EntryKind::Directory,
            relative_path: format!("{relative}/"),
            size_bytes: None,
            size_display: None,
            is_text: None,
        }
    }

    fn file(name: String, relative: String, size: u64, hint: TextHint) -> Self {
        Self {
            name,
            kind: EntryKind::File,
            relative_path: relative,
            size_bytes: Some(size),
            size_display: Some(format_size(size)),
            is_text: Some(hint),
        }
    }
}

/// Enumerates one directory level.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    resolver: PathResolver,
    classifier: TextClassifier,
    classify: bool,
}

impl DirectoryLister {
    /// Create a lister.
    pub fn new(resolver: PathResolver, classifier: TextClassifier) -> Self {
        Self {
            resolver,
            classifier,
            classify: true,
        }
    }

    /// Skip content classification; files report [`TextHint::Unknown`].
    pub fn without_classification(mut self) -> Self {
        self.classify = false;
        self
    }

    /// List the immediate children of `relative`.
    ///
    /// Directories come first, then files, each group in name order. Any
    /// failure while reading an entry fails the whole listing.
    pub fn list(&self, relative: &str) -> Result<Vec<Entry>> {
        let dir = self.resolver.resolve_contained(relative)?;

        match fs::metadata(dir.absolute()) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(RepoError::NotFound(format!("directory {dir}"))),
            Err(e) => return Err(RepoError::from_io(e, format!("directory {dir}"))),
        }

        let mut entries = Vec::new();
        for dirent in fs::read_dir(dir.absolute())? {
            let dirent = dirent?;
            let name = dirent.file_name().to_string_lossy().into_owned();
            let relative = dir.child_relative(&name);
            let path = dirent.path();

            if dirent.file_type()?.is_symlink() && !self.resolver.is_physically_inside(&path) {
                tracing::debug!(path = %relative, "Skipping link leading outside the storage root");
                continue;
            }
            let meta = fs::metadata(&path)?;

            if meta.is_dir() {
                entries.push(Entry::directory(name, relative));
            } else {
                // FIFOs and device nodes are never opened
                let hint = if self.classify && meta.is_file() {
                    TextHint::from(self.classifier.classify_file(&path)?)
                } else {
                    TextHint::Unknown
                };
                entries.push(Entry::file(name, relative, meta.len(), hint));
            }
        }

        entries.sort_by(compare_entries);

        tracing::debug!(path = %dir, count = entries.len(), "Listed directory");
        Ok(entries)
    }
}

/// Directories before files, then by name.
fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    a.kind
        .cmp(&b.kind)
        .then_with(|| compare_names(&a.name, &b.name))
}

/// Locale-style name comparison: accents folded to ASCII and case ignored,
/// with the raw name as a tie-breaker so the order is total.
fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(name: &str) -> String {
    deunicode::deunicode(name).to_lowercase()
}
