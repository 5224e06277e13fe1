//! Registry of in-flight uploads.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

use super::dto::UploadStatus;
use crate::repository::UploadProgress;

/// Shared registry of running uploads, keyed by session ID.
///
/// Entries exist only while the matching [`UploadGuard`] is alive.
#[derive(Debug, Clone, Default)]
pub struct UploadTracker {
    sessions: Arc<RwLock<HashMap<Uuid, UploadStatus>>>,
}

impl UploadTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new upload.
    pub fn begin(&self, directory: &str, file_name: &str, total_bytes: Option<u64>) -> UploadGuard {
        let id = Uuid::new_v4();
        let status = UploadStatus {
            id: id.to_string(),
            directory: directory.to_string(),
            file_name: file_name.to_string(),
            bytes_received: 0,
            total_bytes,
            percent: total_bytes.map(|t| if t == 0 { 100.0 } else { 0.0 }),
            bytes_per_second: 0.0,
        };

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, status);

        UploadGuard {
            tracker: self.clone(),
            id,
        }
    }

    /// Current uploads, ordered by file name.
    pub fn snapshot(&self) -> Vec<UploadStatus> {
        let mut uploads: Vec<UploadStatus> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        uploads.sort_by(|a, b| a.file_name.cmp(&b.file_name).then_with(|| a.id.cmp(&b.id)));
        uploads
    }

    /// Number of running uploads.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no upload is running.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, id: Uuid, progress: &UploadProgress) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = sessions.get_mut(&id) {
            status.bytes_received = progress.bytes_received;
            status.percent = progress.percent();
            status.bytes_per_second = progress.bytes_per_second();
        }
    }

    fn finish(&self, id: Uuid) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Handle for one tracked upload. Dropping it removes the entry.
#[derive(Debug)]
pub struct UploadGuard {
    tracker: UploadTracker,
    id: Uuid,
}

impl UploadGuard {
    /// Session ID.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Record new progress.
    pub fn update(&self, progress: &UploadProgress) {
        self.tracker.update(self.id, progress);
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        self.tracker.finish(self.id);
    }
}
