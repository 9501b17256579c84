pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use sqlx::PgPool;

use crate::services::upload_gate::UploadGate;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
    pub upload_gate: UploadGate,
}

impl AppState {
    pub fn new(db: PgPool, config: config::AppConfig) -> Self {
        let upload_gate = UploadGate::new(config.max_upload_bytes);
        Self {
            db,
            config,
            upload_gate,
        }
    }
}
