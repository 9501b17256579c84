//! Rating routes.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireStudent;
use crate::models::rating::{CreateRating, Rating, RatingFilters};
use crate::services::ratings as rating_service;
use crate::AppState;

/// GET /api/ratings — full rating list, optionally narrowed by `search`, `type`, `semester`.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filters): Query<RatingFilters>,
) -> Result<Json<ApiResponse<Vec<Rating>>>, AppError> {
    let ratings = rating_service::list(&state.db, &filters).await?;
    Ok(ApiResponse::success(ratings))
}

/// POST /api/ratings — submit a course or lecturer rating (students).
pub async fn create(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Json(body): Json<CreateRating>,
) -> Result<Json<ApiResponse<Rating>>, AppError> {
    let rating = rating_service::create(&state.db, student.id, &body).await?;
    Ok(ApiResponse::success(rating))
}
