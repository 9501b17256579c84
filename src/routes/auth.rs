//! Authentication routes: register, login, logout, profile.
//!
//! Register and login return the token in the body and also set it as an
//! HttpOnly cookie scoped to `/api`, so browser clients never need to keep
//! it in script-readable storage.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::{CurrentUser, SESSION_COOKIE};
use crate::models::user::{AuthPayload, LoginUser, RegisterUser, UserResponse};
use crate::services::auth as auth_service;
use crate::AppState;

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/api")
        .build()
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterUser>,
) -> Result<(CookieJar, Json<ApiResponse<AuthPayload>>), AppError> {
    let payload = auth_service::register(
        &state.db,
        &body,
        &state.config.jwt_secret,
        state.config.jwt_expiry_secs,
    )
    .await?;

    let secure = state.config.tls_paths().is_some();
    let jar = jar.add(session_cookie(payload.token.clone(), secure));
    Ok((jar, ApiResponse::success(payload)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginUser>,
) -> Result<(CookieJar, Json<ApiResponse<AuthPayload>>), AppError> {
    let payload = auth_service::login(
        &state.db,
        &body,
        &state.config.jwt_secret,
        state.config.jwt_expiry_secs,
    )
    .await?;

    tracing::info!(user_id = %payload.user.id, "User logged in");

    let secure = state.config.tls_paths().is_some();
    let jar = jar.add(session_cookie(payload.token.clone(), secure));
    Ok((jar, ApiResponse::success(payload)))
}

/// POST /api/auth/logout — drops the session cookie; bearer tokens simply expire.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<&'static str>>) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/api"));
    (jar, ApiResponse::success("Logged out successfully"))
}

/// GET /api/auth/me — current user profile
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::find_user_by_id(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}
