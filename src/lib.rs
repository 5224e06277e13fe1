//! filerepo - Sandboxed File Repository
//!
//! Browse, edit, upload and download files under a single storage root over HTTP.

pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod web;

pub use config::Config;
pub use error::{RepoError, Result};
pub use repository::{FileRepository, StorageRoot};
pub use web::WebServer;
