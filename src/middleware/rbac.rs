//! Role-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserRole;
use crate::AppState;

/// Requires the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires a lecturer or an admin.
#[derive(Debug, Clone)]
pub struct RequireLecturer(pub CurrentUser);

impl FromRequestParts<AppState> for RequireLecturer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        match user.role {
            UserRole::Lecturer | UserRole::Admin => Ok(RequireLecturer(user)),
            UserRole::Student => Err(AppError::Forbidden(
                "Lecturer or admin access required".to_string(),
            )),
        }
    }
}

/// Requires a student; only students submit ratings.
#[derive(Debug, Clone)]
pub struct RequireStudent(pub CurrentUser);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Student {
            return Err(AppError::Forbidden("Student access required".to_string()));
        }
        Ok(RequireStudent(user))
    }
}
