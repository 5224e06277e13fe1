//! HTTP surface for the file repository.
//!
//! JSON API under `/api`, inline file view under `/files`, and `/health`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod tracker;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
pub use tracker::UploadTracker;
