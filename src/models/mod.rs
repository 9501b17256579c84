//! Database models and DTOs for all domain entities.

pub mod announcement;
pub mod discussion;
pub mod document;
pub mod pagination;
pub mod rating;
pub mod user;
