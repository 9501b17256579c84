//! Route definitions for the SmartLearn API.

pub mod announcements;
pub mod auth;
pub mod discussions;
pub mod documents;
pub mod health;
pub mod ratings;
pub mod stats;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::AppState;

/// Build the full application router. Shared by `main` and the integration tests.
pub fn router(state: AppState) -> Router {
    let body_ceiling = state.upload_gate.max_bytes() + documents::MULTIPART_OVERHEAD_BYTES;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            state.config.frontend_url.parse::<HeaderValue>().ok(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let content_routes = Router::new()
        .route("/stats/admin", get(stats::admin))
        .route("/ratings", get(ratings::list).post(ratings::create))
        .route(
            "/announcements",
            get(announcements::list).post(announcements::create),
        )
        .route("/documents", get(documents::list))
        .route(
            "/documents/upload",
            post(documents::upload).layer(DefaultBodyLimit::max(body_ceiling)),
        )
        .route(
            "/discussions",
            get(discussions::list).post(discussions::create),
        )
        .route("/discussions/{id}/replies", post(discussions::reply))
        .route("/discussions/{id}/vote", post(discussions::vote));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", auth_routes.merge(content_routes))
        .layer(RequestBodyLimitLayer::new(body_ceiling))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
