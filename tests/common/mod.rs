//! Test helpers for HTTP integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;

use filerepo::config::{StorageConfig, WebConfig};
use filerepo::web::handlers::AppState;
use filerepo::web::router::{create_health_router, create_router};
use filerepo::FileRepository;

/// Create a test server over a fresh temporary storage root.
pub fn create_test_server() -> (TestServer, TempDir) {
    create_test_server_with(StorageConfig::default(), WebConfig::default())
}

/// Create a test server with custom storage and web settings.
///
/// `storage.root` is replaced by a temporary directory.
pub fn create_test_server_with(
    mut storage: StorageConfig,
    web: WebConfig,
) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    storage.root = temp_dir.path().to_string_lossy().into_owned();

    let repo = FileRepository::open(&storage).expect("Failed to open storage root");
    let app_state = Arc::new(AppState::new(repo));

    let router = create_router(app_state, &web).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, temp_dir)
}

/// Write a file under the storage root, creating parents.
pub fn write_file(root: &Path, relative: &str, content: impl AsRef<[u8]>) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}
