//! Discussion routes: threads, replies, votes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::discussion::{
    CastVote, CreateDiscussion, CreateReply, Discussion, DiscussionSummary, Reply, VoteTally,
};
use crate::models::pagination::{Page, Pagination};
use crate::services::discussions;
use crate::AppState;

/// GET /api/discussions
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Page<DiscussionSummary>>>, AppError> {
    let page = discussions::list(&state.db, &pagination).await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/discussions
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateDiscussion>,
) -> Result<Json<ApiResponse<Discussion>>, AppError> {
    let discussion = discussions::create(&state.db, user.id, &body).await?;
    Ok(ApiResponse::success(discussion))
}

/// POST /api/discussions/{id}/replies
pub async fn reply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateReply>,
) -> Result<Json<ApiResponse<Reply>>, AppError> {
    let reply = discussions::reply(&state.db, id, user.id, &body).await?;
    Ok(ApiResponse::success(reply))
}

/// POST /api/discussions/{id}/vote
pub async fn vote(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CastVote>,
) -> Result<Json<ApiResponse<VoteTally>>, AppError> {
    let tally = discussions::vote(&state.db, id, user.id, body.direction).await?;
    Ok(ApiResponse::success(tally))
}
