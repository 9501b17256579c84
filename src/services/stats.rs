//! Aggregate statistics for the admin dashboard.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;

/// Label used in distributions for students with no value recorded.
pub const UNSPECIFIED_LABEL: &str = "Unspecified";

/// Everything the admin overview page renders, rebuilt on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    pub users: UserCounts,
    pub academic: AcademicCounts,
    pub community: CommunityCounts,
    pub ratings: RatingSummary,
    pub votes: VoteCounts,
    pub faculty: Vec<LabelCount>,
    pub program: Vec<LabelCount>,
    pub year: Vec<LabelCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct UserCounts {
    pub total: i64,
    pub students: i64,
    pub lecturers: i64,
    pub admins: i64,
    pub active: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct AcademicCounts {
    pub courses: i64,
    pub documents: i64,
    pub faculties: i64,
    pub programs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct CommunityCounts {
    pub announcements: i64,
    pub discussions: i64,
    pub replies: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct RatingSummary {
    pub total: i64,
    pub course_ratings: i64,
    pub lecturer_ratings: i64,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct VoteCounts {
    pub total: i64,
    pub upvotes: i64,
    pub downvotes: i64,
}

/// One bar of a distribution chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// Which student attribute a distribution groups by.
#[derive(Debug, Clone, Copy)]
enum StudentAttribute {
    Faculty,
    Program,
    Year,
}

impl StudentAttribute {
    /// SQL expression yielding the label text; values come from this enum only.
    fn label_expr(self) -> &'static str {
        match self {
            Self::Faculty => "NULLIF(TRIM(faculty), '')",
            Self::Program => "NULLIF(TRIM(program), '')",
            Self::Year => "CASE WHEN year_of_study IS NULL THEN NULL ELSE 'Year ' || year_of_study END",
        }
    }
}

/// Run every aggregate query concurrently and assemble the payload.
pub async fn get_admin_stats(pool: &PgPool) -> Result<AdminStats, AppError> {
    let (users, academic, community, ratings, votes, faculty, program, year) = tokio::try_join!(
        fetch_user_counts(pool),
        fetch_academic_counts(pool),
        fetch_community_counts(pool),
        fetch_rating_summary(pool),
        fetch_vote_counts(pool),
        fetch_distribution(pool, StudentAttribute::Faculty),
        fetch_distribution(pool, StudentAttribute::Program),
        fetch_distribution(pool, StudentAttribute::Year),
    )?;

    Ok(AdminStats {
        users,
        academic,
        community,
        ratings,
        votes,
        faculty,
        program,
        year,
    })
}

async fn fetch_user_counts(pool: &PgPool) -> Result<UserCounts, AppError> {
    let row = sqlx::query_as::<_, UserCounts>(
        r#"
        SELECT
            COUNT(*)                                                   AS total,
            COALESCE(SUM(CASE WHEN role = 'student'  THEN 1 ELSE 0 END), 0) AS students,
            COALESCE(SUM(CASE WHEN role = 'lecturer' THEN 1 ELSE 0 END), 0) AS lecturers,
            COALESCE(SUM(CASE WHEN role = 'admin'    THEN 1 ELSE 0 END), 0) AS admins,
            COALESCE(SUM(CASE WHEN is_active         THEN 1 ELSE 0 END), 0) AS active
        FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn fetch_academic_counts(pool: &PgPool) -> Result<AcademicCounts, AppError> {
    let row = sqlx::query_as::<_, AcademicCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM courses)                                      AS courses,
            (SELECT COUNT(*) FROM documents)                                    AS documents,
            (SELECT COUNT(DISTINCT NULLIF(TRIM(faculty), '')) FROM courses)     AS faculties,
            (SELECT COUNT(DISTINCT NULLIF(TRIM(program), '')) FROM courses)     AS programs
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn fetch_community_counts(pool: &PgPool) -> Result<CommunityCounts, AppError> {
    let row = sqlx::query_as::<_, CommunityCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM announcements)       AS announcements,
            (SELECT COUNT(*) FROM discussions)         AS discussions,
            (SELECT COUNT(*) FROM discussion_replies)  AS replies
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn fetch_rating_summary(pool: &PgPool) -> Result<RatingSummary, AppError> {
    let row = sqlx::query_as::<_, RatingSummary>(
        r#"
        SELECT
            COUNT(*)                                                          AS total,
            COALESCE(SUM(CASE WHEN rating_type = 'course'   THEN 1 ELSE 0 END), 0) AS course_ratings,
            COALESCE(SUM(CASE WHEN rating_type = 'lecturer' THEN 1 ELSE 0 END), 0) AS lecturer_ratings,
            COALESCE(AVG(score)::DOUBLE PRECISION, 0)                         AS average_score
        FROM ratings
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(RatingSummary {
        average_score: round_to_hundredths(row.average_score),
        ..row
    })
}

async fn fetch_vote_counts(pool: &PgPool) -> Result<VoteCounts, AppError> {
    let row = sqlx::query_as::<_, VoteCounts>(
        r#"
        SELECT
            COUNT(*)                                                         AS total,
            COALESCE(SUM(CASE WHEN direction = 'up'   THEN 1 ELSE 0 END), 0) AS upvotes,
            COALESCE(SUM(CASE WHEN direction = 'down' THEN 1 ELSE 0 END), 0) AS downvotes
        FROM discussion_votes
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Student counts grouped by one attribute, largest first.
async fn fetch_distribution(
    pool: &PgPool,
    attribute: StudentAttribute,
) -> Result<Vec<LabelCount>, AppError> {
    let sql = format!(
        r#"
        SELECT COALESCE({expr}, '{UNSPECIFIED_LABEL}') AS label, COUNT(*) AS count
        FROM users
        WHERE role = 'student'
        GROUP BY 1
        ORDER BY count DESC, label ASC
        "#,
        expr = attribute.label_expr(),
    );
    let rows = sqlx::query_as::<_, LabelCount>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
