//! User model, roles, and the registration/login schemas.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Lecturer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Lecturer => "lecturer",
            Self::Admin => "admin",
        }
    }

    /// Landing page for this role after a successful sign-in.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Self::Student => "/student/dashboard",
            Self::Lecturer => "/lecturer/dashboard",
            Self::Admin => "/admin/dashboard",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "lecturer" => Ok(Self::Lecturer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Full user row from database (includes password_hash — never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub student_id: Option<String>,
    pub faculty: Option<String>,
    pub program: Option<String>,
    pub year_of_study: Option<i16>,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response DTO — excludes password_hash and lockout bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub student_id: Option<String>,
    pub faculty: Option<String>,
    pub program: Option<String>,
    pub year_of_study: Option<i16>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            role: u.role,
            student_id: u.student_id,
            faculty: u.faculty,
            program: u.program,
            year_of_study: u.year_of_study,
            is_active: u.is_active,
            last_login: u.last_login,
            created_at: u.created_at,
        }
    }
}

/// Self-service registration form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_student_profile"))]
pub struct RegisterUser {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Full name must be between 2 and 100 characters"
    ))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[validate(custom(function = "validate_self_service_role"))]
    pub role: UserRole,
    #[validate(length(max = 32, message = "Student ID is too long"))]
    pub student_id: Option<String>,
    pub faculty: Option<String>,
    pub program: Option<String>,
    #[validate(range(min = 1, max = 6, message = "Year of study must be between 1 and 6"))]
    pub year_of_study: Option<i16>,
}

fn validate_self_service_role(role: &UserRole) -> Result<(), ValidationError> {
    if *role == UserRole::Admin {
        return Err(ValidationError::new("role")
            .with_message("Admin accounts cannot be self-registered".into()));
    }
    Ok(())
}

fn validate_student_profile(form: &RegisterUser) -> Result<(), ValidationError> {
    if form.role != UserRole::Student {
        return Ok(());
    }
    let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
    if blank(&form.faculty) || blank(&form.program) || form.year_of_study.is_none() {
        return Err(ValidationError::new("student_profile")
            .with_message("Students must provide faculty, program and year of study".into()));
    }
    Ok(())
}

/// Credentials submitted to the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Body returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthPayload {
    pub user: UserResponse,
    pub token: String,
}
