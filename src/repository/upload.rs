//! Streaming upload ingestion with progress reporting.

use std::fmt::Display;
use std::time::{Duration, Instant};

use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::path::{PathResolver, ResolvedPath};
use crate::{RepoError, Result};

/// Progress snapshot of a running upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadProgress {
    /// Bytes written so far.
    pub bytes_received: u64,
    /// Expected total, when the transport announced one.
    pub total_bytes: Option<u64>,
    /// Time since the upload started.
    pub elapsed: Duration,
}

impl UploadProgress {
    /// Progress as a percentage (0.0 to 100.0), if the total is known.
    pub fn percent(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(100.0),
            Some(total) => Some((self.bytes_received as f64 / total as f64 * 100.0).min(100.0)),
            None => None,
        }
    }

    /// Average throughput since the start.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_received as f64 / secs
    }
}

/// State of one transfer. Lives only for the duration of a `receive` call.
#[derive(Debug)]
pub struct UploadSession {
    target: ResolvedPath,
    bytes_received: u64,
    total_bytes: Option<u64>,
    started: Instant,
}

impl UploadSession {
    fn new(target: ResolvedPath, total_bytes: Option<u64>) -> Self {
        Self {
            target,
            bytes_received: 0,
            total_bytes,
            started: Instant::now(),
        }
    }

    fn record(&mut self, n: usize) {
        self.bytes_received += n as u64;
    }

    /// Current progress.
    pub fn progress(&self) -> UploadProgress {
        UploadProgress {
            bytes_received: self.bytes_received,
            total_bytes: self.total_bytes,
            elapsed: self.started.elapsed(),
        }
    }
}

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Path of the stored file relative to the storage root.
    pub relative_path: String,
    /// Bytes written.
    pub bytes_written: u64,
    /// Transfer duration.
    pub elapsed: Duration,
}

impl UploadOutcome {
    /// Average throughput of the whole transfer.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_written as f64 / secs
    }
}

/// Streams uploaded content into the storage tree.
///
/// Content goes straight to the destination file; an interrupted transfer
/// leaves whatever was written so far.
#[derive(Debug, Clone)]
pub struct UploadReceiver {
    resolver: PathResolver,
}

impl UploadReceiver {
    /// Create a receiver.
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Resolve and check an upload destination without writing anything.
    pub async fn prepare(&self, directory: &str, file_name: &str) -> Result<ResolvedPath> {
        let dir = self.resolver.resolve(directory)?;
        let target = self.resolver.resolve_child(directory, file_name)?;
        self.resolver.contain(&target)?;

        match tokio::fs::metadata(dir.absolute()).await {
            Ok(meta) if meta.is_dir() => Ok(target),
            Ok(_) => Err(RepoError::NotFound(format!("directory {dir}"))),
            Err(e) => Err(RepoError::from_io(e, format!("directory {dir}"))),
        }
    }

    /// Write `stream` to `directory/file_name`, replacing any existing file.
    ///
    /// `on_progress` is called after every chunk written.
    pub async fn receive<S, D, E, F>(
        &self,
        directory: &str,
        file_name: &str,
        stream: S,
        total_bytes: Option<u64>,
        mut on_progress: F,
    ) -> Result<UploadOutcome>
    where
        S: Stream<Item = std::result::Result<D, E>>,
        D: AsRef<[u8]>,
        E: Display,
        F: FnMut(&UploadProgress),
    {
        let target = self.prepare(directory, file_name).await?;
        let mut file = File::create(target.absolute()).await?;
        let mut session = UploadSession::new(target, total_bytes);

        tracing::info!(path = %session.target, total = ?total_bytes, "Upload started");

        let mut stream = std::pin::pin!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                tracing::warn!(
                    path = %session.target,
                    received = session.bytes_received,
                    error = %e,
                    "Upload interrupted"
                );
                RepoError::Upload(e.to_string())
            })?;
            let bytes = chunk.as_ref();
            file.write_all(bytes).await?;
            session.record(bytes.len());
            on_progress(&session.progress());
        }
        file.flush().await?;

        let progress = session.progress();
        let outcome = UploadOutcome {
            relative_path: session.target.relative().to_string(),
            bytes_written: progress.bytes_received,
            elapsed: progress.elapsed,
        };

        tracing::info!(
            path = %session.target,
            bytes = outcome.bytes_written,
            bytes_per_second = outcome.bytes_per_second() as u64,
            "Upload finished"
        );
        Ok(outcome)
    }
}
