//! Upload handlers.

use std::sync::Arc;

use axum::{
    extract::{multipart::{MultipartError, MultipartRejection}, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::web::dto::{UploadQuery, UploadResponse, UploadsResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Base name of a client-supplied file name (strips any client-side directory).
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
}

/// Redirect target for browser form posts: the directory's page.
fn directory_location(relative: &str) -> String {
    let encoded: Vec<String> = relative
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect();
    format!("/{}", encoded.join("/"))
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::too_large("Upload exceeds the configured size limit")
    } else {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    }
}

/// POST /api/upload - Stream a multipart file into a directory.
///
/// Fields: `directory` (optional, must precede `file`), `size` (optional
/// expected byte count), `file`. Without a `directory` field the
/// `?directory=` query parameter is used, then the root.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!("Rejected upload body: {}", e);
        ApiError::bad_request(format!("Invalid multipart data: {}", e.body_text()))
    })?;
    let mut directory = query.directory.unwrap_or_default();
    let mut declared_size: Option<u64> = None;
    let mut outcome = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "directory" => {
                directory = field.text().await.map_err(multipart_error)?;
            }
            "size" => {
                let text = field.text().await.map_err(multipart_error)?;
                declared_size = text.trim().parse().ok();
            }
            "file" => {
                let file_name = field.file_name().map(base_name).unwrap_or("").to_string();
                if file_name.is_empty() {
                    return Err(ApiError::bad_request("No file uploaded"));
                }

                let total = declared_size.or_else(|| {
                    headers
                        .get(header::CONTENT_LENGTH)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse().ok())
                });

                state.repo.uploads().prepare(&directory, &file_name).await?;
                let guard = state.uploads.begin(&directory, &file_name, total);
                outcome = Some(
                    state
                        .repo
                        .uploads()
                        .receive(&directory, &file_name, field, total, |p| guard.update(p))
                        .await?,
                );
                break;
            }
            _ => {}
        }
    }

    let outcome = outcome.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    if wants_json(&headers) {
        return Ok(Json(UploadResponse::from(outcome)).into_response());
    }

    let dir = state.repo.resolver().resolve(&directory)?;
    Ok(Redirect::to(&directory_location(dir.relative())).into_response())
}

/// GET /api/uploads - List uploads in progress.
pub async fn list_uploads(State(state): State<Arc<AppState>>) -> Json<UploadsResponse> {
    Json(UploadsResponse {
        uploads: state.uploads.snapshot(),
    })
}
