//! Seed script for development — populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env).

use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@cug.edu.gh";
const ADMIN_PASSWORD: &str = "Admin123!";
const DEFAULT_PASSWORD: &str = "Password123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")?;
    let pool = smartlearn::db::create_pool(&db_url, 5).await?;
    smartlearn::db::run_migrations(&pool).await?;

    println!("=== SmartLearn Seed Script ===");

    seed_admin(&pool).await?;
    let lecturers = seed_lecturers(&pool).await?;
    let students = seed_students(&pool).await?;
    let courses = seed_courses(&pool, &lecturers).await?;
    seed_announcements(&pool, &lecturers, &courses).await?;
    seed_ratings(&pool, &students, &lecturers, &courses).await?;
    seed_discussions(&pool, &students).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: {ADMIN_EMAIL} / {ADMIN_PASSWORD}");
    println!("Other accounts use: {DEFAULT_PASSWORD}");

    Ok(())
}

async fn upsert_user(
    pool: &PgPool,
    full_name: &str,
    email: &str,
    password: &str,
    role: &str,
    profile: Option<(&str, &str, i16)>,
) -> anyhow::Result<Uuid> {
    let hash = smartlearn::services::auth::hash_password(password)?;
    let (faculty, program, year) = match profile {
        Some((f, p, y)) => (Some(f), Some(p), Some(y)),
        None => (None, None, None),
    };

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (full_name, email, password_hash, role, faculty, program, year_of_study)
         VALUES ($1, $2, $3, $4::user_role, $5, $6, $7)
         ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash
         RETURNING id",
    )
    .bind(full_name)
    .bind(email)
    .bind(&hash)
    .bind(role)
    .bind(faculty)
    .bind(program)
    .bind(year)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_admin(pool: &PgPool) -> anyhow::Result<()> {
    upsert_user(pool, "System Administrator", ADMIN_EMAIL, ADMIN_PASSWORD, "admin", None).await?;
    println!("[done] Admin account ready");
    Ok(())
}

async fn seed_lecturers(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let lecturers = [
        ("Dr. Kwame Boateng", "k.boateng@cug.edu.gh"),
        ("Prof. Efua Owusu", "e.owusu@cug.edu.gh"),
    ];
    let mut ids = Vec::new();
    for (name, email) in lecturers {
        ids.push(upsert_user(pool, name, email, DEFAULT_PASSWORD, "lecturer", None).await?);
    }
    println!("[done] {} lecturers", ids.len());
    Ok(ids)
}

async fn seed_students(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let students = [
        ("Ama Mensah", "ama.mensah@cug.edu.gh", "Engineering", "Computer Science", 2),
        ("Yaw Asante", "yaw.asante@cug.edu.gh", "Engineering", "Computer Science", 3),
        ("Akosua Darko", "akosua.darko@cug.edu.gh", "Business", "Accounting", 1),
        ("Kojo Appiah", "kojo.appiah@cug.edu.gh", "Engineering", "Telecommunications", 4),
    ];
    let mut ids = Vec::new();
    for (name, email, faculty, program, year) in students {
        let profile = Some((faculty, program, year));
        ids.push(upsert_user(pool, name, email, DEFAULT_PASSWORD, "student", profile).await?);
    }
    println!("[done] {} students", ids.len());
    Ok(ids)
}

async fn seed_courses(pool: &PgPool, lecturers: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
    let courses = [
        ("CSC201", "Data Structures", "Engineering", "Computer Science"),
        ("CSC305", "Operating Systems", "Engineering", "Computer Science"),
        ("ACC101", "Principles of Accounting", "Business", "Accounting"),
    ];
    let mut ids = Vec::new();
    for (i, (code, title, faculty, program)) in courses.into_iter().enumerate() {
        let lecturer = lecturers.get(i % lecturers.len().max(1)).copied();
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO courses (code, title, faculty, program, lecturer_id)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (code) DO UPDATE SET title = EXCLUDED.title
             RETURNING id",
        )
        .bind(code)
        .bind(title)
        .bind(faculty)
        .bind(program)
        .bind(lecturer)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }
    println!("[done] {} courses", ids.len());
    Ok(ids)
}

async fn seed_announcements(
    pool: &PgPool,
    lecturers: &[Uuid],
    courses: &[Uuid],
) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM announcements")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Announcements already exist ({count})");
        return Ok(());
    }

    let (Some(author), Some(course)) = (lecturers.first(), courses.first()) else {
        return Ok(());
    };
    sqlx::query(
        "INSERT INTO announcements (title, body, course_id, author_id) VALUES
         ('Mid-semester exam', 'The mid-semester exam holds in Week 7, Room B12.', $1, $2),
         ('Welcome back', 'Lecture slides for Week 1 are now on SmartLearn.', NULL, $2)",
    )
    .bind(course)
    .bind(author)
    .execute(pool)
    .await?;

    println!("[done] Sample announcements");
    Ok(())
}

async fn seed_ratings(
    pool: &PgPool,
    students: &[Uuid],
    lecturers: &[Uuid],
    courses: &[Uuid],
) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Ratings already exist ({count})");
        return Ok(());
    }

    for (i, student) in students.iter().enumerate() {
        let course = courses[i % courses.len()];
        let lecturer = lecturers[i % lecturers.len()];
        let score = (i % 5) as i16 + 1;

        sqlx::query(
            "INSERT INTO ratings (reviewer_id, is_anonymous, rating_type, course_id, semester, score, comment, clarity)
             VALUES ($1, $2, 'course', $3, '2024/1', $4, 'Well structured course', $4)",
        )
        .bind(student)
        .bind(i % 2 == 0)
        .bind(course)
        .bind(score)
        .execute(pool)
        .await?;

        sqlx::query(
            "INSERT INTO ratings (reviewer_id, is_anonymous, rating_type, lecturer_id, semester, score, fairness)
             VALUES ($1, FALSE, 'lecturer', $2, '2024/2', $3, $3)",
        )
        .bind(student)
        .bind(lecturer)
        .bind(6 - score)
        .execute(pool)
        .await?;
    }

    println!("[done] Sample ratings");
    Ok(())
}

async fn seed_discussions(pool: &PgPool, students: &[Uuid]) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM discussions")
        .fetch_one(pool)
        .await?;
    if count > 0 || students.is_empty() {
        println!("[skip] Discussions already exist ({count})");
        return Ok(());
    }

    let thread: Uuid = sqlx::query_scalar(
        "INSERT INTO discussions (title, body, author_id)
         VALUES ('Study group for Data Structures', 'Anyone meeting at the library on Friday?', $1)
         RETURNING id",
    )
    .bind(students[0])
    .fetch_one(pool)
    .await?;

    for (i, student) in students.iter().enumerate().skip(1) {
        sqlx::query("INSERT INTO discussion_replies (discussion_id, author_id, body) VALUES ($1, $2, 'Count me in')")
            .bind(thread)
            .bind(student)
            .execute(pool)
            .await?;
        let direction = if i % 3 == 0 { "down" } else { "up" };
        sqlx::query(
            "INSERT INTO discussion_votes (discussion_id, voter_id, direction) VALUES ($1, $2, $3::vote_direction)",
        )
        .bind(thread)
        .bind(student)
        .bind(direction)
        .execute(pool)
        .await?;
    }

    println!("[done] Sample discussion thread");
    Ok(())
}
