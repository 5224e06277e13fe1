//! File repository service.
//!
//! This module provides the sandboxed file operations behind the API:
//! - Path resolution against a fixed storage root
//! - Directory listing with sizes and text/binary hints
//! - Size-limited reading and saving for the editor
//! - Creating and deleting files and directories
//! - Streaming uploads with progress reporting

mod classify;
mod edit;
mod listing;
mod mutate;
mod path;
mod size;
mod upload;

pub use classify::{TextClassifier, TextHint, MIN_CLASSIFY_CHARS};
pub use edit::{EditDocument, FileEditGate};
pub use listing::{DirectoryLister, Entry, EntryKind};
pub use mutate::{CreateKind, CreateRequest, Deleted, EntryMutator};
pub use path::{is_single_component, PathResolver, ResolvedPath, StorageRoot};
pub use size::format_size;
pub use upload::{UploadOutcome, UploadProgress, UploadReceiver, UploadSession};

use crate::config::StorageConfig;
use crate::Result;

/// Default maximum size of a file opened for editing (16 KB).
pub const DEFAULT_MAX_EDIT_SIZE: u64 = 16 * 1024;

/// Default number of leading bytes examined by the text classifier (1 MB).
pub const DEFAULT_CLASSIFY_LIMIT: usize = 1024 * 1024;

/// Default minimum share of printable characters for text.
pub const DEFAULT_TEXT_RATIO: f64 = 0.75;

/// All repository components sharing one storage root.
#[derive(Debug, Clone)]
pub struct FileRepository {
    resolver: PathResolver,
    lister: DirectoryLister,
    edit_gate: FileEditGate,
    mutator: EntryMutator,
    uploads: UploadReceiver,
}

impl FileRepository {
    /// Build the repository with default limits.
    pub fn new(root: StorageRoot) -> Self {
        Self::with_config(root, &StorageConfig::default())
    }

    /// Build the repository with limits from configuration.
    pub fn with_config(root: StorageRoot, config: &StorageConfig) -> Self {
        let resolver = PathResolver::new(root);
        let classifier = TextClassifier::new(config.classify_limit, config.text_ratio);

        let mut lister = DirectoryLister::new(resolver.clone(), classifier);
        if !config.classify_text {
            lister = lister.without_classification();
        }

        Self {
            lister,
            edit_gate: FileEditGate::new(resolver.clone(), classifier)
                .with_max_size(config.max_edit_size),
            mutator: EntryMutator::new(resolver.clone()),
            uploads: UploadReceiver::new(resolver.clone()),
            resolver,
        }
    }

    /// Open the storage root named in `config` and build the repository.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let root = StorageRoot::open(&config.root)?;
        Ok(Self::with_config(root, config))
    }

    /// The storage root.
    pub fn root(&self) -> &StorageRoot {
        self.resolver.root()
    }

    /// Path resolver.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Directory lister.
    pub fn lister(&self) -> &DirectoryLister {
        &self.lister
    }

    /// Edit gate.
    pub fn edit_gate(&self) -> &FileEditGate {
        &self.edit_gate
    }

    /// Entry mutator.
    pub fn mutator(&self) -> &EntryMutator {
        &self.mutator
    }

    /// Upload receiver.
    pub fn uploads(&self) -> &UploadReceiver {
        &self.uploads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepoError;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::new(StorageRoot::open(temp_dir.path()).unwrap());
        (temp_dir, repo)
    }

    #[test]
    fn test_round_trip() {
        let (_temp_dir, repo) = setup();

        repo.mutator().create_directory("", "dir").unwrap();
        repo.mutator().create_file("dir", "a.txt", "hello").unwrap();

        let entries = repo.lister().list("dir").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[0].size_bytes, Some(5));
        assert_eq!(entries[0].size_display.as_deref(), Some("5 B"));

        let doc = repo.edit_gate().read_for_edit("dir/a.txt").unwrap();
        assert_eq!(doc.content, "hello");

        repo.edit_gate().save("dir/a.txt", "world").unwrap();
        let doc = repo.edit_gate().read_for_edit("dir/a.txt").unwrap();
        assert_eq!(doc.content, "world");
    }

    #[test]
    fn test_delete_directory_removes_children() {
        let (_temp_dir, repo) = setup();

        repo.mutator().create_directory("", "dir").unwrap();
        repo.mutator().create_directory("dir", "sub").unwrap();
        repo.mutator().create_file("dir/sub", "a.txt", "x").unwrap();

        repo.mutator().delete("dir").unwrap();

        assert!(matches!(repo.lister().list("dir"), Err(RepoError::NotFound(_))));
        assert!(matches!(
            repo.lister().list("dir/sub"),
            Err(RepoError::NotFound(_))
        ));
        assert!(matches!(
            repo.edit_gate().read_for_edit("dir/sub/a.txt"),
            Err(RepoError::NotFound(_))
        ));
    }

    #[test]
    fn test_with_config_applies_limits() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            root: temp_dir.path().to_string_lossy().into_owned(),
            max_edit_size: 4,
            classify_text: false,
            ..Default::default()
        };
        let repo = FileRepository::open(&config).unwrap();

        repo.mutator().create_file("", "a.txt", "hello").unwrap();

        assert!(matches!(
            repo.edit_gate().read_for_edit("a.txt"),
            Err(RepoError::TooLarge { size: 5, limit: 4 })
        ));
        let entries = repo.lister().list("").unwrap();
        assert_eq!(entries[0].is_text, Some(TextHint::Unknown));
    }

    #[test]
    fn test_sandbox_containment_across_operations() {
        let (temp_dir, repo) = setup();
        let outside = temp_dir.path().parent().unwrap().join("outside.txt");

        for input in ["../outside.txt", "/etc/passwd", "a/../../outside.txt"] {
            assert!(matches!(
                repo.lister().list(input),
                Err(RepoError::InvalidPath(_))
            ));
            assert!(matches!(
                repo.edit_gate().read_for_edit(input),
                Err(RepoError::InvalidPath(_))
            ));
            assert!(matches!(
                repo.edit_gate().save(input, "x"),
                Err(RepoError::InvalidPath(_))
            ));
            assert!(matches!(
                repo.mutator().delete(input),
                Err(RepoError::InvalidPath(_))
            ));
        }
        assert!(!outside.exists());
    }
}
