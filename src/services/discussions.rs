//! Discussion threads, replies, and up/down votes.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::discussion::{
    CreateDiscussion, CreateReply, Discussion, DiscussionSummary, Reply, VoteDirection, VoteTally,
};
use crate::models::pagination::{Page, Pagination};

pub async fn list(
    pool: &PgPool,
    pagination: &Pagination,
) -> Result<Page<DiscussionSummary>, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM discussions")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, DiscussionSummary>(
        r#"
        SELECT
            d.id, d.title, d.body, d.course_id, d.author_id,
            u.full_name AS author_name,
            (SELECT COUNT(*) FROM discussion_replies r WHERE r.discussion_id = d.id) AS reply_count,
            (SELECT COUNT(*) FROM discussion_votes v
              WHERE v.discussion_id = d.id AND v.direction = 'up')   AS upvotes,
            (SELECT COUNT(*) FROM discussion_votes v
              WHERE v.discussion_id = d.id AND v.direction = 'down') AS downvotes,
            d.created_at
        FROM discussions d
        INNER JOIN users u ON u.id = d.author_id
        ORDER BY d.created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(items, total, pagination))
}

pub async fn create(
    pool: &PgPool,
    author_id: Uuid,
    input: &CreateDiscussion,
) -> Result<Discussion, AppError> {
    input.validate()?;

    let discussion = sqlx::query_as::<_, Discussion>(
        "INSERT INTO discussions (title, body, course_id, author_id)
         VALUES ($1, $2, $3, $4) RETURNING *",
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

    Ok(discussion)
}

pub async fn reply(
    pool: &PgPool,
    discussion_id: Uuid,
    author_id: Uuid,
    input: &CreateReply,
) -> Result<Reply, AppError> {
    input.validate()?;

    sqlx::query_as::<_, Reply>(
        "INSERT INTO discussion_replies (discussion_id, author_id, body)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(discussion_id)
    .bind(author_id)
    .bind(&input.body)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound("Discussion not found".to_string())
        }
        _ => AppError::Database(e),
    })
}

/// Record the user's vote, replacing any earlier vote on the same thread.
pub async fn vote(
    pool: &PgPool,
    discussion_id: Uuid,
    voter_id: Uuid,
    direction: VoteDirection,
) -> Result<VoteTally, AppError> {
    sqlx::query(
        r#"
        INSERT INTO discussion_votes (discussion_id, voter_id, direction)
        VALUES ($1, $2, $3)
        ON CONFLICT (discussion_id, voter_id)
        DO UPDATE SET direction = EXCLUDED.direction, updated_at = NOW()
        "#,
    )
    .bind(discussion_id)
    .bind(voter_id)
    .bind(direction)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound("Discussion not found".to_string())
        }
        _ => AppError::Database(e),
    })?;

    let tally = sqlx::query_as::<_, VoteTally>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN direction = 'up'   THEN 1 ELSE 0 END), 0) AS upvotes,
            COALESCE(SUM(CASE WHEN direction = 'down' THEN 1 ELSE 0 END), 0) AS downvotes
        FROM discussion_votes
        WHERE discussion_id = $1
        "#,
    )
    .bind(discussion_id)
    .fetch_one(pool)
    .await?;

    Ok(tally)
}
