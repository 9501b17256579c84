//! Announcement feed.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::announcement::{Announcement, CreateAnnouncement};
use crate::models::pagination::{Page, Pagination};

const SELECT_ANNOUNCEMENTS: &str = r#"
    SELECT a.id, a.title, a.body, a.course_id, a.author_id,
           u.full_name AS author_name, a.created_at
    FROM announcements a
    INNER JOIN users u ON u.id = a.author_id
"#;

pub async fn list(pool: &PgPool, pagination: &Pagination) -> Result<Page<Announcement>, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM announcements")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Announcement>(&format!(
        "{SELECT_ANNOUNCEMENTS} ORDER BY a.created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(items, total, pagination))
}

pub async fn create(
    pool: &PgPool,
    author_id: Uuid,
    input: &CreateAnnouncement,
) -> Result<Announcement, AppError> {
    input.validate()?;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO announcements (title, body, course_id, author_id)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(input.title.trim())
    .bind(&input.body)
    .bind(input.course_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound("Course not found".to_string())
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!(announcement_id = %id, author_id = %author_id, "Announcement posted");

    let announcement =
        sqlx::query_as::<_, Announcement>(&format!("{SELECT_ANNOUNCEMENTS} WHERE a.id = $1"))
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(announcement)
}
