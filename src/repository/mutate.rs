//! Creating and deleting entries.

use std::fs;

use serde::Deserialize;

use super::path::PathResolver;
use crate::{RepoError, Result};

/// What `create` should make.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CreateKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

/// A create request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    /// Kind of entry.
    #[serde(rename = "type")]
    pub kind: CreateKind,
    /// Parent directory, relative to the storage root.
    #[serde(default)]
    pub directory: String,
    /// Name of the new entry.
    pub name: String,
    /// Initial content (files only).
    #[serde(default)]
    pub content: Option<String>,
}

/// What `delete` removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deleted {
    /// A file (or symlink).
    File,
    /// A directory and everything under it.
    Directory,
}

/// Creates and deletes files and directories.
#[derive(Debug, Clone)]
pub struct EntryMutator {
    resolver: PathResolver,
}

impl EntryMutator {
    /// Create a mutator.
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Dispatch a [`CreateRequest`].
    pub fn create(&self, req: &CreateRequest) -> Result<()> {
        match req.kind {
            CreateKind::File => self.create_file(
                &req.directory,
                &req.name,
                req.content.as_deref().unwrap_or_default(),
            ),
            CreateKind::Directory => self.create_directory(&req.directory, &req.name),
        }
    }

    /// Write `directory/name`, overwriting any existing file.
    pub fn create_file(&self, directory: &str, name: &str, content: &str) -> Result<()> {
        let path = self.resolver.resolve_child(directory, name)?;
        self.resolver.contain(&path)?;

        fs::write(path.absolute(), content)?;

        tracing::info!(path = %path, bytes = content.len(), "Created file");
        Ok(())
    }

    /// Create `directory/name` and any missing parents.
    ///
    /// Succeeds if the directory already exists.
    pub fn create_directory(&self, directory: &str, name: &str) -> Result<()> {
        let path = self.resolver.resolve_child(directory, name)?;
        self.resolver.contain(&path)?;

        fs::create_dir_all(path.absolute())?;

        tracing::info!(path = %path, "Created directory");
        Ok(())
    }

    /// Delete a file, or a directory with all its descendants.
    ///
    /// The storage root itself can never be deleted.
    pub fn delete(&self, relative: &str) -> Result<Deleted> {
        let path = self.resolver.resolve(relative)?;
        if path.is_root() {
            return Err(RepoError::InvalidPath(
                "cannot delete the storage root".to_string(),
            ));
        }

        self.resolver.contain_parent(&path)?;

        // symlink_metadata: a link to a directory is removed as a link
        let meta = fs::symlink_metadata(path.absolute())
            .map_err(|e| RepoError::from_io(e, format!("path {path}")))?;

        let deleted = if meta.is_dir() {
            fs::remove_dir_all(path.absolute())
                .map_err(|e| RepoError::from_io(e, format!("path {path}")))?;
            Deleted::Directory
        } else {
            fs::remove_file(path.absolute())
                .map_err(|e| RepoError::from_io(e, format!("path {path}")))?;
            Deleted::File
        };

        tracing::info!(path = %path, kind = ?deleted, "Deleted entry");
        Ok(deleted)
    }
}
