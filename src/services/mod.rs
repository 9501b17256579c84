//! Business logic services.

pub mod announcements;
pub mod auth;
pub mod discussions;
pub mod documents;
pub mod ratings;
pub mod stats;
pub mod upload_gate;
