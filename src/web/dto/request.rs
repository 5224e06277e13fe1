//! Request DTOs for Web API.

use serde::Deserialize;

pub use crate::repository::CreateRequest;

/// Save request body.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// New file content.
    pub content: String,
}

/// Query parameters for upload.
///
/// A `directory` form field sent before the file takes precedence.
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Target directory relative to the storage root.
    #[serde(default)]
    pub directory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::CreateKind;

    #[test]
    fn test_save_request_deserialize() {
        let req: SaveRequest = serde_json::from_str(r#"{"content":"hello"}"#).unwrap();
        assert_eq!(req.content, "hello");
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateRequest =
            serde_json::from_str(r#"{"type":"file","name":"a.txt"}"#).unwrap();
        assert_eq!(req.kind, CreateKind::File);
        assert_eq!(req.directory, "");
        assert!(req.content.is_none());
    }

    #[test]
    fn test_create_request_rejects_unknown_type() {
        let result: Result<CreateRequest, _> =
            serde_json::from_str(r#"{"type":"symlink","name":"a"}"#);
        assert!(result.is_err());
    }
}
