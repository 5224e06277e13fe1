//! Sandboxed path resolution.
//!
//! Every repository operation turns its caller-supplied path into a
//! [`ResolvedPath`] here before touching the filesystem. Resolution is pure
//! path arithmetic: separators are normalized, `.` and `..` are folded, and
//! anything that would land outside the storage root is rejected.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{RepoError, Result};

/// The directory bounding all addressable content.
///
/// Fixed at service start; cloned into every component that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    path: PathBuf,
}

impl StorageRoot {
    /// Open a storage root, creating the directory if it doesn't exist.
    ///
    /// The path is canonicalized once here so later containment checks
    /// compare against a stable absolute form.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let path = path.canonicalize()?;
        if !path.is_dir() {
            return Err(RepoError::Config(format!(
                "storage root is not a directory: {}",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// Absolute path of the root.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A path proven to lie inside the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: String,
}

impl ResolvedPath {
    /// Absolute filesystem path.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Normalized POSIX path relative to the root, without leading or
    /// trailing separators. Empty for the root itself.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Whether this is the storage root.
    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    /// Last path component, or an empty string for the root.
    pub fn file_name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or_default()
    }

    /// Relative path of a child entry.
    pub fn child_relative(&self, name: &str) -> String {
        if self.relative.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.relative, name)
        }
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.relative)
    }
}

/// Resolves caller-supplied relative paths against a [`StorageRoot`].
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: StorageRoot,
}

impl PathResolver {
    /// Create a resolver for the given root.
    pub fn new(root: StorageRoot) -> Self {
        Self { root }
    }

    /// The storage root.
    pub fn root(&self) -> &StorageRoot {
        &self.root
    }

    /// Resolve `relative` to a path inside the storage root.
    ///
    /// An empty string resolves to the root itself. Absolute inputs, NUL
    /// bytes and `..` sequences that climb above the root fail with
    /// [`RepoError::InvalidPath`].
    pub fn resolve(&self, relative: &str) -> Result<ResolvedPath> {
        let normalized = relative.replace('\\', "/");

        if normalized.contains('\0') {
            return Err(RepoError::InvalidPath(relative.to_string()));
        }
        if is_absolute(&normalized) {
            return Err(RepoError::InvalidPath(relative.to_string()));
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(RepoError::InvalidPath(relative.to_string()));
                    }
                }
                s => segments.push(s),
            }
        }

        let mut absolute = self.root.path.clone();
        for segment in &segments {
            absolute.push(segment);
        }

        if !absolute.starts_with(&self.root.path) {
            return Err(RepoError::InvalidPath(relative.to_string()));
        }

        Ok(ResolvedPath {
            absolute,
            relative: segments.join("/"),
        })
    }

    /// Resolve `relative` and check its physical location with [`contain`].
    ///
    /// [`contain`]: PathResolver::contain
    pub fn resolve_contained(&self, relative: &str) -> Result<ResolvedPath> {
        let path = self.resolve(relative)?;
        self.contain(&path)?;
        Ok(path)
    }

    /// Check that symlinks along `path` do not lead outside the root.
    ///
    /// The deepest existing ancestor of `path` (the path itself if present)
    /// is canonicalized and must lie inside the root. A dangling symlink on
    /// the way fails too, since writing through it would create its target.
    pub fn contain(&self, path: &ResolvedPath) -> Result<()> {
        self.contain_from(path.absolute(), path)
    }

    /// Like [`contain`], starting at the parent of `path`.
    ///
    /// Used where the last component is handled as a link, not followed.
    ///
    /// [`contain`]: PathResolver::contain
    pub fn contain_parent(&self, path: &ResolvedPath) -> Result<()> {
        match path.absolute().parent() {
            Some(parent) => self.contain_from(parent, path),
            None => Ok(()),
        }
    }

    /// Whether `absolute` physically lies inside the root (following links).
    ///
    /// Missing and dangling paths count as outside.
    pub fn is_physically_inside(&self, absolute: &Path) -> bool {
        absolute
            .canonicalize()
            .map(|real| real.starts_with(&self.root.path))
            .unwrap_or(false)
    }

    fn contain_from(&self, start: &Path, path: &ResolvedPath) -> Result<()> {
        let mut probe = start;
        loop {
            if probe.symlink_metadata().is_ok() {
                let real = match probe.canonicalize() {
                    Ok(real) => real,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Err(RepoError::InvalidPath(format!(
                            "{path} goes through a dangling link"
                        )));
                    }
                    Err(e) => return Err(RepoError::Io(e)),
                };
                if real.starts_with(&self.root.path) {
                    return Ok(());
                }
                tracing::warn!(path = %path, "Rejected path leaving the storage root via a link");
                return Err(RepoError::InvalidPath(format!(
                    "{path} leaves the storage root"
                )));
            }
            match probe.parent() {
                Some(parent) if parent.starts_with(&self.root.path) => probe = parent,
                _ => return Ok(()),
            }
        }
    }

    /// Resolve `directory/name`, where `name` must be a single path component.
    pub fn resolve_child(&self, directory: &str, name: &str) -> Result<ResolvedPath> {
        if !is_single_component(name) {
            return Err(RepoError::InvalidPath(name.to_string()));
        }
        let parent = self.resolve(directory)?;
        self.resolve(&parent.child_relative(name))
    }
}

/// Whether `path` (with `/` separators) is absolute on any platform we serve.
fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    // Drive prefix such as `C:` or `C:/...`
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// A non-empty name with no separators that is not `.` or `..`.
pub fn is_single_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
