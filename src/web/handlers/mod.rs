//! API handlers.

pub mod file;
pub mod upload;

pub use file::*;
pub use upload::*;

use crate::repository::FileRepository;
use crate::web::error::ApiError;
use crate::web::tracker::UploadTracker;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sandboxed file repository.
    pub repo: FileRepository,
    /// In-flight upload registry.
    pub uploads: UploadTracker,
}

impl AppState {
    /// Create a new application state.
    pub fn new(repo: FileRepository) -> Self {
        Self {
            repo,
            uploads: UploadTracker::new(),
        }
    }
}

/// Run a blocking repository call off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("Blocking task failed: {}", e);
            ApiError::internal("An internal error occurred")
        })?
        .map_err(ApiError::from)
}
