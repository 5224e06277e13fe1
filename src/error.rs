//! Error types for filerepo.

use thiserror::Error;

/// Common error type for repository operations.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Path escapes the storage root or does not name a valid target.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Entry does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// File is larger than the edit gate allows.
    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Configured maximum in bytes.
        limit: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure while receiving an upload.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RepoError {
    /// Map an I/O error to `NotFound` when it is ENOENT, `Io` otherwise.
    pub fn from_io(err: std::io::Error, what: impl Into<String>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            RepoError::NotFound(what.into())
        } else {
            RepoError::Io(err)
        }
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display() {
        let err = RepoError::InvalidPath("../etc".to_string());
        assert_eq!(err.to_string(), "invalid path: ../etc");
    }

    #[test]
    fn test_not_found_display() {
        let err = RepoError::NotFound("docs/a.txt".to_string());
        assert_eq!(err.to_string(), "docs/a.txt not found");
    }

    #[test]
    fn test_too_large_display() {
        let err = RepoError::TooLarge {
            size: 16385,
            limit: 16384,
        };
        assert_eq!(
            err.to_string(),
            "file too large: 16385 bytes (limit 16384 bytes)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RepoError = io_err.into();
        assert!(matches!(err, RepoError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_from_io_maps_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = RepoError::from_io(io_err, "a.txt");
        assert!(matches!(err, RepoError::NotFound(ref p) if p == "a.txt"));

        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err = RepoError::from_io(io_err, "a.txt");
        assert!(matches!(err, RepoError::Io(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(RepoError::Upload("connection reset".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
