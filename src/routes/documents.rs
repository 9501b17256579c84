//! Document routes: gated multipart upload and listing.

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireLecturer;
use crate::models::document::{Document, NewDocument};
use crate::models::pagination::{Page, Pagination};
use crate::services::documents;
use crate::services::upload_gate::UploadRejection;
use crate::AppState;

/// Headroom for multipart boundaries and the small text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

fn multipart_error(e: MultipartError, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadRejection::TooLarge { limit }.into()
    } else {
        AppError::Validation(format!("Multipart error: {e}"))
    }
}

/// POST /api/documents/upload — single `file` field plus optional `title` and `course_id`.
///
/// Requests whose declared length exceeds the ceiling are refused by the
/// router's body limit before reaching here. The type check runs on the part
/// headers before any content is read, and the size ceiling is enforced
/// chunk by chunk while streaming.
pub async fn upload(
    State(state): State<AppState>,
    RequireLecturer(user): RequireLecturer,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Document>>, AppError> {
    let gate = &state.upload_gate;
    let limit = gate.max_bytes();

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut title: Option<String> = None;
    let mut course_id: Option<Uuid> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(AppError::Validation(
                        "Only one file may be uploaded per request".to_string(),
                    ));
                }
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                if let Err(rejection) = gate.check_type(&mime, &file_name) {
                    tracing::warn!(user_id = %user.id, file_name = %file_name, mime = %mime, "Upload rejected by type");
                    return Err(rejection.into());
                }

                let mut buffer = gate.buffer();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, limit))?
                {
                    if let Err(rejection) = buffer.push(&chunk) {
                        tracing::warn!(user_id = %user.id, file_name = %file_name, "Upload rejected by size");
                        return Err(rejection.into());
                    }
                }
                file = Some((file_name, mime, buffer.into_bytes()));
            }
            "title" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read title: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    title = Some(text.to_string());
                }
            }
            "course_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read course_id: {e}")))?;
                course_id = Some(text.trim().parse().map_err(|_| {
                    AppError::Validation(format!("Invalid course_id '{text}'"))
                })?);
            }
            _ => {}
        }
    }

    let (original_name, mime_type, data) = file.ok_or_else(|| {
        AppError::Validation("Missing 'file' field in multipart request".to_string())
    })?;

    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let meta = NewDocument {
        title: title.unwrap_or_else(|| original_name.clone()),
        original_name,
        mime_type,
        course_id,
    };

    let document = documents::store(
        &state.db,
        &state.config.upload_dir,
        gate,
        &meta,
        &data,
        user.id,
    )
    .await?;

    Ok(ApiResponse::success(document))
}

/// GET /api/documents
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Page<Document>>>, AppError> {
    let page = documents::list(&state.db, &pagination).await?;
    Ok(ApiResponse::success(page))
}
