//! Session extractor for Axum handlers.
//!
//! Accepts the token from an `Authorization: Bearer` header or, failing
//! that, from the HttpOnly session cookie set at login.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::services::auth as auth_service;
use crate::AppState;

/// Name of the session cookie carrying the JWT.
pub const SESSION_COOKIE: &str = "smartlearn_session";

/// Authenticated user extracted from the session token.
///
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

/// Pull the raw token out of the request, header first.
pub fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(AppError::Unauthorized)?;
        let claims = auth_service::validate_token(&token, &state.config.jwt_secret)?;

        let id: Uuid = claims
            .user_id
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        let role: UserRole = claims
            .role
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid role in token: {e}")))?;

        Ok(CurrentUser {
            id,
            email: claims.sub,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_header_preferred_over_cookie() {
        let p = parts(
            Request::builder()
                .header("Authorization", "Bearer header-token")
                .header("Cookie", format!("{SESSION_COOKIE}=cookie-token")),
        );
        assert_eq!(token_from_parts(&p).as_deref(), Some("header-token"));
    }

    #[test]
    fn cookie_used_without_header() {
        let p = parts(
            Request::builder().header("Cookie", format!("theme=dark; {SESSION_COOKIE}=abc")),
        );
        assert_eq!(token_from_parts(&p).as_deref(), Some("abc"));
    }

    #[test]
    fn non_bearer_scheme_ignored() {
        let p = parts(Request::builder().header("Authorization", "Basic dXNlcjpwYXNz"));
        assert!(token_from_parts(&p).is_none());
    }
}
