//! Discussion threads, replies, and votes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "vote_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// Thread row with reply and vote counts, for list views.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DiscussionSummary {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub course_id: Option<Uuid>,
    pub author_id: Uuid,
    pub author_name: String,
    pub reply_count: i64,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Discussion {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub course_id: Option<Uuid>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reply {
    pub id: Uuid,
    pub discussion_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDiscussion {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Body must not be empty"))]
    pub body: String,
    pub course_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReply {
    #[validate(length(min = 1, max = 5000, message = "Reply must not be empty"))]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastVote {
    pub direction: VoteDirection,
}

/// Current vote totals for one discussion.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_direction_parses_lowercase() {
        let vote: CastVote = serde_json::from_str(r#"{"direction":"down"}"#).unwrap();
        assert_eq!(vote.direction, VoteDirection::Down);
    }

    #[test]
    fn empty_reply_rejected() {
        let reply = CreateReply {
            body: String::new(),
        };
        assert!(reply.validate().is_err());
    }
}
