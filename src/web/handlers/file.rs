//! File handlers: listing, editing, create, delete, download and view.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::header,
    response::Response,
    Json,
};
use tokio_util::io::ReaderStream;
use tower::util::ServiceExt;
use tower_http::services::ServeFile;

use crate::repository::{CreateKind, CreateRequest, Deleted, ResolvedPath};
use crate::web::dto::{ActionResponse, ApiJson, EditResponse, ListResponse, SaveRequest};
use crate::web::error::ApiError;
use crate::web::handlers::{run_blocking, AppState};
use crate::RepoError;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped and quotes/backslashes replaced in the
/// plain `filename` parameter; non-ASCII names also get an RFC 5987
/// `filename*` parameter.
pub(crate) fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized,
        urlencoding::encode(filename)
    )
}

/// GET /api/list/ - List the storage root.
pub async fn list_root(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse>, ApiError> {
    list(state, String::new()).await
}

/// GET /api/list/*path - List a directory.
pub async fn list_directory(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<ListResponse>, ApiError> {
    list(state, path).await
}

async fn list(state: Arc<AppState>, path: String) -> Result<Json<ListResponse>, ApiError> {
    let repo = state.repo.clone();
    let files = run_blocking(move || repo.lister().list(&path)).await?;
    Ok(Json(ListResponse { files }))
}

/// GET /api/edit/*path - Open a file for editing.
pub async fn read_for_edit(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<EditResponse>, ApiError> {
    let repo = state.repo.clone();
    let doc = run_blocking(move || repo.edit_gate().read_for_edit(&path)).await?;
    Ok(Json(doc.into()))
}

/// POST /api/save/*path - Overwrite a file.
pub async fn save_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    ApiJson(req): ApiJson<SaveRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let repo = state.repo.clone();
    run_blocking(move || repo.edit_gate().save(&path, &req.content)).await?;
    Ok(Json(ActionResponse::ok("File saved successfully")))
}

/// POST /api/create - Create a file or directory.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let message = match req.kind {
        CreateKind::File => "File created successfully",
        CreateKind::Directory => "Directory created successfully",
    };

    let repo = state.repo.clone();
    run_blocking(move || repo.mutator().create(&req)).await?;
    Ok(Json(ActionResponse::ok(message)))
}

/// POST /api/delete/ - Always rejected; the root cannot be deleted.
pub async fn delete_root(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionResponse>, ApiError> {
    delete(state, String::new()).await
}

/// POST /api/delete/*path - Delete a file or directory tree.
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    delete(state, path).await
}

async fn delete(state: Arc<AppState>, path: String) -> Result<Json<ActionResponse>, ApiError> {
    let repo = state.repo.clone();
    let deleted = run_blocking(move || repo.mutator().delete(&path)).await?;
    let message = match deleted {
        Deleted::File => "File deleted successfully",
        Deleted::Directory => "Directory deleted successfully",
    };
    Ok(Json(ActionResponse::ok(message)))
}

/// Resolve `path` to an existing regular file.
async fn resolve_file(state: &AppState, path: &str) -> Result<(ResolvedPath, u64), ApiError> {
    let target = state.repo.resolver().resolve_contained(path)?;
    let meta = tokio::fs::metadata(target.absolute())
        .await
        .map_err(|e| RepoError::from_io(e, format!("file {target}")))?;
    if meta.is_dir() {
        return Err(RepoError::InvalidPath(format!("{target} is a directory")).into());
    }
    Ok((target, meta.len()))
}

/// GET /api/download/*path - Stream a file as an attachment.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let (target, size) = resolve_file(&state, &path).await?;
    let file = tokio::fs::File::open(target.absolute())
        .await
        .map_err(|e| RepoError::from_io(e, format!("file {target}")))?;
    let mime = mime_guess::from_path(target.absolute()).first_or_octet_stream();

    tracing::info!(path = %target, bytes = size, "Download started");

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(target.file_name()),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /files/*path - Serve a file inline with a guessed content type.
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    req: Request,
) -> Result<Response, ApiError> {
    let (target, _) = resolve_file(&state, &path).await?;

    let response = ServeFile::new(target.absolute())
        .oneshot(req)
        .await
        .unwrap_or_else(|never| match never {});

    Ok(response.map(Body::new))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_with_spaces() {
        let result = content_disposition_header("my document.txt");
        assert_eq!(result, "attachment; filename=\"my document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_non_ascii() {
        let result = content_disposition_header("résumé.txt");
        assert!(result.starts_with("attachment; filename=\"résumé.txt\""));
        assert!(result.contains("filename*=UTF-8''r%C3%A9sum%C3%A9.txt"));
    }

    #[test]
    fn test_content_disposition_header_double_quote() {
        let result = content_disposition_header("test\"file.txt");
        assert!(result.contains("filename=\"test_file.txt\""));
        assert!(result.contains("%22"));
    }

    #[test]
    fn test_content_disposition_header_control_characters() {
        let result = content_disposition_header("test\r\nX-Injected: bad.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }
}
