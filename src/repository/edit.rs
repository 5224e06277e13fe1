//! Size-limited read/write path for interactive editing.

use std::fs;

use super::classify::{TextClassifier, TextHint};
use super::path::PathResolver;
use super::DEFAULT_MAX_EDIT_SIZE;
use crate::{RepoError, Result};

/// A file opened for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDocument {
    /// Full file content (invalid UTF-8 replaced).
    pub content: String,
    /// Base file name.
    pub name: String,
    /// Normalized path relative to the storage root.
    pub relative_path: String,
    /// Size on disk in bytes.
    pub size: u64,
    /// Text hint for the content.
    pub text_hint: TextHint,
}

/// Bounded read/write path for editing.
///
/// Reads are refused above `max_size`; writes are never limited, so a save
/// can produce a file the gate will later refuse to open.
#[derive(Debug, Clone)]
pub struct FileEditGate {
    resolver: PathResolver,
    classifier: TextClassifier,
    max_size: u64,
}

impl FileEditGate {
    /// Create an edit gate with the default size cap.
    pub fn new(resolver: PathResolver, classifier: TextClassifier) -> Self {
        Self {
            resolver,
            classifier,
            max_size: DEFAULT_MAX_EDIT_SIZE,
        }
    }

    /// Set the maximum editable size in bytes.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Maximum editable size in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Open a file for editing.
    pub fn read_for_edit(&self, relative: &str) -> Result<EditDocument> {
        let path = self.resolver.resolve_contained(relative)?;

        let meta = fs::metadata(path.absolute())
            .map_err(|e| RepoError::from_io(e, format!("file {path}")))?;
        if meta.is_dir() {
            return Err(RepoError::InvalidPath(format!("{path} is a directory")));
        }

        let size = meta.len();
        if size > self.max_size {
            return Err(RepoError::TooLarge {
                size,
                limit: self.max_size,
            });
        }

        let bytes =
            fs::read(path.absolute()).map_err(|e| RepoError::from_io(e, format!("file {path}")))?;
        let text_hint = TextHint::from(self.classifier.classify(&bytes));

        Ok(EditDocument {
            content: String::from_utf8_lossy(&bytes).into_owned(),
            name: path.file_name().to_string(),
            relative_path: path.relative().to_string(),
            size,
            text_hint,
        })
    }

    /// Overwrite a file with `content`. Last write wins.
    pub fn save(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.resolver.resolve(relative)?;
        if path.is_root() {
            return Err(RepoError::InvalidPath("cannot write to the storage root".to_string()));
        }
        self.resolver.contain(&path)?;

        fs::write(path.absolute(), content)?;

        tracing::info!(path = %path, bytes = content.len(), "Saved file");
        Ok(())
    }
}
