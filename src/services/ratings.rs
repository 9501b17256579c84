//! Rating queries and submission.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::rating::{CreateRating, Rating, RatingFilters, RatingSubject, RatingType, SubScores};

/// Flat row joining a rating with its reviewer and subject names.
#[derive(Debug, FromRow)]
struct RatingRow {
    id: Uuid,
    reviewer_id: Uuid,
    reviewer_name: String,
    is_anonymous: bool,
    rating_type: RatingType,
    course_id: Option<Uuid>,
    course_name: Option<String>,
    lecturer_id: Option<Uuid>,
    lecturer_name: Option<String>,
    semester: String,
    score: i16,
    comment: Option<String>,
    clarity: Option<i16>,
    engagement: Option<i16>,
    organization: Option<i16>,
    fairness: Option<i16>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = AppError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        let subject = match row.rating_type {
            RatingType::Course => RatingSubject::Course {
                course_id: row.course_id.ok_or_else(|| missing_subject(row.id))?,
                course_name: row.course_name.unwrap_or_default(),
            },
            RatingType::Lecturer => RatingSubject::Lecturer {
                lecturer_id: row.lecturer_id.ok_or_else(|| missing_subject(row.id))?,
                lecturer_name: row.lecturer_name.unwrap_or_default(),
            },
        };

        let (reviewer_id, reviewer_name) = if row.is_anonymous {
            (None, None)
        } else {
            (Some(row.reviewer_id), Some(row.reviewer_name))
        };

        Ok(Rating {
            id: row.id,
            reviewer_id,
            reviewer_name,
            is_anonymous: row.is_anonymous,
            subject,
            semester: row.semester,
            score: row.score,
            comment: row.comment,
            sub_scores: SubScores {
                clarity: row.clarity,
                engagement: row.engagement,
                organization: row.organization,
                fairness: row.fairness,
            },
            created_at: row.created_at,
        })
    }
}

fn missing_subject(id: Uuid) -> AppError {
    AppError::Internal(format!("Rating {id} has no subject for its type"))
}

const SELECT_RATINGS: &str = r#"
    SELECT
        r.id, r.reviewer_id, u.full_name AS reviewer_name, r.is_anonymous, r.rating_type,
        r.course_id, c.title AS course_name,
        r.lecturer_id, l.full_name AS lecturer_name,
        r.semester, r.score, r.comment,
        r.clarity, r.engagement, r.organization, r.fairness, r.created_at
    FROM ratings r
    INNER JOIN users u ON u.id = r.reviewer_id
    LEFT JOIN courses c ON c.id = r.course_id
    LEFT JOIN users l ON l.id = r.lecturer_id
"#;

/// Fetch every rating, newest first, then apply the same in-memory filter the
/// ratings browser uses.
pub async fn list(pool: &PgPool, filters: &RatingFilters) -> Result<Vec<Rating>, AppError> {
    let rows = sqlx::query_as::<_, RatingRow>(&format!("{SELECT_RATINGS} ORDER BY r.created_at DESC"))
        .fetch_all(pool)
        .await?;

    let ratings = rows
        .into_iter()
        .map(Rating::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ratings.into_iter().filter(|r| filters.matches(r)).collect())
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Rating, AppError> {
    let row = sqlx::query_as::<_, RatingRow>(&format!("{SELECT_RATINGS} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Rating not found".to_string()))?;
    Rating::try_from(row)
}

/// Record a rating from a student.
pub async fn create(pool: &PgPool, reviewer_id: Uuid, input: &CreateRating) -> Result<Rating, AppError> {
    input.validate()?;

    match input.rating_type {
        RatingType::Course => {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                    .bind(input.course_id)
                    .fetch_one(pool)
                    .await?;
            if !exists {
                return Err(AppError::NotFound("Course not found".to_string()));
            }
        }
        RatingType::Lecturer => {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND role = 'lecturer')",
            )
            .bind(input.lecturer_id)
            .fetch_one(pool)
            .await?;
            if !exists {
                return Err(AppError::NotFound("Lecturer not found".to_string()));
            }
        }
    }

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO ratings (reviewer_id, is_anonymous, rating_type, course_id, lecturer_id,
                             semester, score, comment, clarity, engagement, organization, fairness)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id
        "#,
    )
    .bind(reviewer_id)
    .bind(input.is_anonymous)
    .bind(input.rating_type)
    .bind(input.course_id)
    .bind(input.lecturer_id)
    .bind(input.semester.trim())
    .bind(input.score)
    .bind(&input.comment)
    .bind(input.clarity)
    .bind(input.engagement)
    .bind(input.organization)
    .bind(input.fairness)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AppError::Conflict(
            "You have already rated this subject for the semester".to_string(),
        ),
        _ => AppError::Database(e),
    })?;

    tracing::info!(rating_id = %id, reviewer_id = %reviewer_id, "Rating submitted");
    find_by_id(pool, id).await
}
