//! Upload storage and read-back

use crate::{ApiError, ApiResult, AppState};

use parley_core::api::{FileContentResponse, UploadResponse};

use std::path::Path;

use axum::{
    Json,
    extract::{Multipart, Path as UrlPath, State, multipart::MultipartError},
    http::StatusCode,
};
use rand::Rng;

const FILE_FIELD: &str = "file";
const FALLBACK_MIME: &str = "application/octet-stream";

/// POST /api/upload (multipart, field `file`)
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_rejection(&state, e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let mime = field.content_type().unwrap_or(FALLBACK_MIME).to_string();
        if !state.upload_config.is_allowed(&mime) {
            return Err(ApiError::bad_request(format!(
                "File type {mime} is not allowed"
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_rejection(&state, e))?;
        if data.len() > state.upload_config.max_bytes {
            return Err(ApiError::bad_request("File too large"));
        }

        let filename = stored_name(&original_name);
        let target = state.upload_dir.join(&filename);
        tokio::fs::write(&target, &data).await.map_err(|e| {
            state.reject(ApiError::internal("Failed to upload file", e.to_string()))
        })?;

        log::info!(
            "Stored upload {original_name} as {filename} ({} bytes)",
            data.len()
        );

        return Ok(Json(UploadResponse {
            success: true,
            path: format!("/uploads/{filename}"),
            filename,
            original_name,
            size: data.len() as u64,
        }));
    }

    Err(ApiError::bad_request("No file uploaded"))
}

/// GET /api/file-content/{filename}
pub async fn file_content(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> ApiResult<Json<FileContentResponse>> {
    if !is_plain_file_name(&filename) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let candidate = state.upload_dir.join(&filename);
    let exists = tokio::fs::try_exists(&candidate).await.unwrap_or(false);
    if !exists {
        return Err(ApiError::not_found("File not found"));
    }

    let read_failed = |e: std::io::Error| {
        state.reject(ApiError::internal("Failed to read file", e.to_string()))
    };

    // Symlinks can still point elsewhere; compare resolved paths.
    let root = tokio::fs::canonicalize(&state.upload_dir)
        .await
        .map_err(read_failed)?;
    let resolved = tokio::fs::canonicalize(&candidate)
        .await
        .map_err(read_failed)?;
    if !resolved.starts_with(&root) {
        log::warn!("Rejected read of {} outside upload dir", resolved.display());
        return Err(ApiError::forbidden("Access denied"));
    }

    let bytes = tokio::fs::read(&resolved).await.map_err(read_failed)?;

    Ok(Json(FileContentResponse {
        content: String::from_utf8_lossy(&bytes).into_owned(),
    }))
}

fn multipart_rejection(state: &AppState, e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::bad_request("File too large");
    }
    if e.status().is_server_error() {
        return state.reject(ApiError::internal("Failed to upload file", e.body_text()));
    }
    ApiError::bad_request(format!("Invalid upload: {}", e.body_text()))
}

/// `file-<millis>-<random>.<ext>`, keeping the uploaded extension
fn stored_name(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("file-{millis}-{suffix}.{ext}"),
        None => format!("file-{millis}-{suffix}"),
    }
}

/// A single path component with no traversal
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
}
