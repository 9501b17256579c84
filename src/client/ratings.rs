//! Ratings browser: one fetch, then purely in-memory filtering.

use std::collections::BTreeSet;

use crate::client::{ApiClient, CredentialStore, Notices, ViewState};
use crate::models::rating::{Rating, RatingFilters, RatingType};

pub const RATINGS_PATH: &str = "ratings";

#[derive(Debug)]
pub struct RatingsBrowser {
    state: ViewState<Vec<Rating>>,
    filters: RatingFilters,
    notices: Notices,
}

impl Default for RatingsBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingsBrowser {
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            filters: RatingFilters::default(),
            notices: Notices::default(),
        }
    }

    /// Load the full, unpaginated list.
    pub async fn load(&mut self, client: &ApiClient, store: &CredentialStore) {
        self.state = ViewState::Loading;
        self.state = match client
            .get_authed::<Vec<Rating>>(RATINGS_PATH, store.token())
            .await
        {
            Ok(ratings) => ViewState::Loaded(ratings),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load ratings");
                let message = e.user_message();
                self.notices.error(message.clone());
                ViewState::Failed(message)
            }
        };
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = Some(search.into());
    }

    pub fn set_type(&mut self, rating_type: Option<RatingType>) {
        self.filters.rating_type = rating_type;
    }

    pub fn set_semester(&mut self, semester: Option<String>) {
        self.filters.semester = semester;
    }

    pub fn filters(&self) -> &RatingFilters {
        &self.filters
    }

    /// Ratings passing the current filters, recomputed from the full list.
    pub fn visible(&self) -> Vec<&Rating> {
        self.state
            .data()
            .map(|all| self.filters.apply(all))
            .unwrap_or_default()
    }

    /// Distinct semesters present in the loaded list, for the semester picker.
    pub fn semesters(&self) -> Vec<&str> {
        self.state
            .data()
            .map(|all| {
                all.iter()
                    .map(|r| r.semester.as_str())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn state(&self) -> &ViewState<Vec<Rating>> {
        &self.state
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }
}
