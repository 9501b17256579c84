//! Announcement routes.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireLecturer;
use crate::models::announcement::{Announcement, CreateAnnouncement};
use crate::models::pagination::{Page, Pagination};
use crate::services::announcements;
use crate::AppState;

/// GET /api/announcements
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Page<Announcement>>>, AppError> {
    let page = announcements::list(&state.db, &pagination).await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/announcements (lecturer+)
pub async fn create(
    State(state): State<AppState>,
    RequireLecturer(author): RequireLecturer,
    Json(body): Json<CreateAnnouncement>,
) -> Result<Json<ApiResponse<Announcement>>, AppError> {
    let announcement = announcements::create(&state.db, author.id, &body).await?;
    Ok(ApiResponse::success(announcement))
}
