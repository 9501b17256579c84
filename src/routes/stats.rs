//! Admin statistics route.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::services::stats::{self, AdminStats};
use crate::AppState;

/// GET /api/stats/admin — aggregate counts and distributions for the admin dashboard.
pub async fn admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<AdminStats>>, AppError> {
    let stats = stats::get_admin_stats(&state.db).await?;
    Ok(ApiResponse::success(stats))
}
