//! Admin dashboard view model.

use crate::client::{ApiClient, CredentialStore, Notices, ViewState};
use crate::services::stats::AdminStats;

pub const STATS_PATH: &str = "stats/admin";

/// Fetches the aggregate payload once per mount and holds it for display.
#[derive(Debug)]
pub struct AdminDashboard {
    state: ViewState<AdminStats>,
    notices: Notices,
}

impl Default for AdminDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminDashboard {
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            notices: Notices::default(),
        }
    }

    /// Issue the single stats request. A missing token, a non-OK status, and
    /// `success:false` all land in `Failed` with exactly one error notice.
    pub async fn mount(&mut self, client: &ApiClient, store: &CredentialStore) {
        self.state = ViewState::Loading;
        self.state = match client
            .get_authed::<AdminStats>(STATS_PATH, store.token())
            .await
        {
            Ok(stats) => ViewState::Loaded(stats),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load admin statistics");
                let message = e.user_message();
                self.notices.error(message.clone());
                ViewState::Failed(message)
            }
        };
    }

    pub fn state(&self) -> &ViewState<AdminStats> {
        &self.state
    }

    pub fn stats(&self) -> Option<&AdminStats> {
        self.state.data()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }
}
