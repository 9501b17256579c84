//! Uploaded course documents.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored document metadata. `stored_name` is the collision-free name on disk.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum_sha256: String,
    pub course_id: Option<Uuid>,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Metadata accompanying an accepted upload.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub original_name: String,
    pub mime_type: String,
    pub course_id: Option<Uuid>,
}
