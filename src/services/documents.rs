//! Document storage: writes gate-approved uploads to disk and records them.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{Document, NewDocument};
use crate::models::pagination::{Page, Pagination};
use crate::services::upload_gate::UploadGate;

/// Create the uploads directory if it does not exist yet.
pub async fn ensure_upload_dir(dir: &Path) -> Result<(), AppError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Cannot create upload dir {}: {e}", dir.display())))
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Write the bytes under a fresh destination name, returning the name and path.
async fn write_upload(
    upload_dir: &Path,
    gate: &UploadGate,
    original_name: &str,
    data: &[u8],
) -> Result<(String, PathBuf), AppError> {
    let stored_name = gate.destination_name(original_name);
    let path = upload_dir.join(&stored_name);
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write upload: {e}")))?;
    Ok((stored_name, path))
}

/// Persist an accepted upload under a collision-free name and record it.
///
/// The file is removed again if the database insert fails.
pub async fn store(
    pool: &PgPool,
    upload_dir: &Path,
    gate: &UploadGate,
    meta: &NewDocument,
    data: &[u8],
    uploaded_by: Uuid,
) -> Result<Document, AppError> {
    gate.check_size(data.len())?;

    let (stored_name, path) = write_upload(upload_dir, gate, &meta.original_name, data).await?;

    let checksum = sha256_hex(data);
    let size_bytes = i64::try_from(data.len())
        .map_err(|_| AppError::Internal("Upload size overflow".to_string()))?;

    let inserted = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents (title, original_name, stored_name, mime_type, size_bytes,
                               checksum_sha256, course_id, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&meta.title)
    .bind(&meta.original_name)
    .bind(&stored_name)
    .bind(&meta.mime_type)
    .bind(size_bytes)
    .bind(&checksum)
    .bind(meta.course_id)
    .bind(uploaded_by)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(doc) => {
            tracing::info!(
                document_id = %doc.id,
                file_name = %doc.original_name,
                stored_name = %doc.stored_name,
                size_bytes,
                "Document stored"
            );
            Ok(doc)
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&path).await {
                tracing::warn!(error = %rm, path = %path.display(), "Failed to remove orphaned upload");
            }
            Err(match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::NotFound("Course not found".to_string())
                }
                _ => AppError::Database(e),
            })
        }
    }
}

pub async fn list(pool: &PgPool, pagination: &Pagination) -> Result<Page<Document>, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Document>(
        "SELECT * FROM documents ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(items, total, pagination))
}
