//! Response DTOs for Web API.

use serde::Serialize;

use crate::repository::{EditDocument, Entry, TextHint, UploadOutcome};

/// Directory listing response.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Entries, directories first.
    pub files: Vec<Entry>,
}

/// File opened for editing.
#[derive(Debug, Serialize)]
pub struct EditResponse {
    /// File content.
    pub content: String,
    /// Base file name.
    pub filename: String,
    /// Path relative to the storage root.
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// Size in bytes.
    pub size: u64,
    /// Text hint.
    #[serde(rename = "isText")]
    pub is_text: TextHint,
}

impl From<EditDocument> for EditResponse {
    fn from(doc: EditDocument) -> Self {
        Self {
            content: doc.content,
            filename: doc.name,
            file_path: doc.relative_path,
            size: doc.size,
            is_text: doc.text_hint,
        }
    }
}

/// Outcome of a mutating operation.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl ActionResponse {
    /// Create a success response.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Upload acknowledgement.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Stored path relative to the storage root.
    pub path: String,
    /// Bytes written.
    pub bytes: u64,
    /// Average throughput.
    #[serde(rename = "bytesPerSecond")]
    pub bytes_per_second: f64,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        Self {
            success: true,
            message: "File uploaded successfully".to_string(),
            bytes_per_second: outcome.bytes_per_second(),
            path: outcome.relative_path,
            bytes: outcome.bytes_written,
        }
    }
}

/// Progress of one in-flight upload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadStatus {
    /// Session ID.
    pub id: String,
    /// Target directory as sent by the client.
    pub directory: String,
    /// File name.
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Bytes received so far.
    #[serde(rename = "bytesReceived")]
    pub bytes_received: u64,
    /// Expected total, if known.
    #[serde(rename = "totalBytes")]
    pub total_bytes: Option<u64>,
    /// Percent complete, if the total is known.
    pub percent: Option<f64>,
    /// Average throughput so far.
    #[serde(rename = "bytesPerSecond")]
    pub bytes_per_second: f64,
}

/// In-flight uploads.
#[derive(Debug, Serialize)]
pub struct UploadsResponse {
    /// Active sessions.
    pub uploads: Vec<UploadStatus>,
}
