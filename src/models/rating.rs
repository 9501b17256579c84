//! Course and lecturer ratings, plus the in-memory filter shared by the API
//! and the ratings browser.

use chrono::{DateTime, Utc};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "rating_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RatingType {
    Course,
    Lecturer,
}

/// What was rated. The `type` tag decides which id/name pair is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RatingSubject {
    Course { course_id: Uuid, course_name: String },
    Lecturer { lecturer_id: Uuid, lecturer_name: String },
}

impl RatingSubject {
    pub fn kind(&self) -> RatingType {
        match self {
            Self::Course { .. } => RatingType::Course,
            Self::Lecturer { .. } => RatingType::Lecturer,
        }
    }

    /// Display name used for free-text search.
    pub fn name(&self) -> &str {
        match self {
            Self::Course { course_name, .. } => course_name,
            Self::Lecturer { lecturer_name, .. } => lecturer_name,
        }
    }
}

/// Optional named sub-scores, each 1–5.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubScores {
    pub clarity: Option<i16>,
    pub engagement: Option<i16>,
    pub organization: Option<i16>,
    pub fairness: Option<i16>,
}

/// A rating as exposed by `GET /ratings`.
///
/// Anonymous ratings never carry the reviewer's identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub reviewer_name: Option<String>,
    pub is_anonymous: bool,
    #[serde(flatten)]
    pub subject: RatingSubject,
    pub semester: String,
    pub score: i16,
    pub comment: Option<String>,
    #[serde(flatten)]
    pub sub_scores: SubScores,
    pub created_at: DateTime<Utc>,
}

/// The three independent rating filters.
///
/// Each predicate is evaluated against the full list, so the order in which
/// filters are set never changes the result. Blank strings count as unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingFilters {
    pub search: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "blank_as_none")]
    pub rating_type: Option<RatingType>,
    pub semester: Option<String>,
}

/// `?type=` (an "all types" picker) means no type filter.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<RatingType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => RatingType::deserialize(value.into_deserializer()).map(Some),
    }
}

impl RatingFilters {
    pub fn matches(&self, rating: &Rating) -> bool {
        self.matches_search(rating) && self.matches_type(rating) && self.matches_semester(rating)
    }

    pub fn apply<'a>(&self, ratings: &'a [Rating]) -> Vec<&'a Rating> {
        ratings.iter().filter(|r| self.matches(r)).collect()
    }

    fn matches_search(&self, rating: &Rating) -> bool {
        match non_blank(&self.search) {
            Some(needle) => rating
                .subject
                .name()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }

    fn matches_type(&self, rating: &Rating) -> bool {
        self.rating_type.map_or(true, |t| rating.subject.kind() == t)
    }

    fn matches_semester(&self, rating: &Rating) -> bool {
        non_blank(&self.semester).map_or(true, |s| rating.semester == s)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Body of `POST /ratings`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_subject_id"))]
pub struct CreateRating {
    #[serde(rename = "type")]
    pub rating_type: RatingType,
    pub course_id: Option<Uuid>,
    pub lecturer_id: Option<Uuid>,
    #[validate(length(min = 1, max = 40, message = "Semester is required"))]
    pub semester: String,
    #[validate(range(min = 1, max = 5, message = "Score must be between 1 and 5"))]
    pub score: i16,
    #[validate(length(max = 2000, message = "Comment is too long"))]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[validate(range(min = 1, max = 5, message = "Sub-scores must be between 1 and 5"))]
    pub clarity: Option<i16>,
    #[validate(range(min = 1, max = 5, message = "Sub-scores must be between 1 and 5"))]
    pub engagement: Option<i16>,
    #[validate(range(min = 1, max = 5, message = "Sub-scores must be between 1 and 5"))]
    pub organization: Option<i16>,
    #[validate(range(min = 1, max = 5, message = "Sub-scores must be between 1 and 5"))]
    pub fairness: Option<i16>,
}

fn validate_subject_id(input: &CreateRating) -> Result<(), ValidationError> {
    let ok = match input.rating_type {
        RatingType::Course => input.course_id.is_some() && input.lecturer_id.is_none(),
        RatingType::Lecturer => input.lecturer_id.is_some() && input.course_id.is_none(),
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("subject")
            .with_message("Exactly one subject id matching the rating type is required".into()))
    }
}
