//! Typed HTTP client for the SmartLearn API, plus the view models the web
//! dashboards are built on: admin statistics, the ratings browser, and the
//! login/registration forms.
//!
//! Each view issues at most one request per user action and never retries.
//! Failures end in a single error [`Notice`].

pub mod auth;
pub mod dashboard;
pub mod ratings;

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::ApiResponse;
use crate::models::user::UserResponse;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Authentication required. Please log in.")]
    MissingToken,

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("{0}")]
    Rejected(String),
}

impl ClientError {
    /// Text to show the user: the server's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-facing message (a toast in the web UI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Notices raised by a view, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Notices(Vec<Notice>);

impl Notices {
    pub fn success(&mut self, message: impl Into<String>) {
        self.0.push(Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.0.push(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        });
    }

    pub fn all(&self) -> &[Notice] {
        &self.0
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notice> {
        self.0.iter().filter(|n| n.level == NoticeLevel::Error)
    }
}

/// Lifecycle of a view backed by one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Client-held session: token, signed-in user, and the "remember me" email.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    token: Option<String>,
    user: Option<UserResponse>,
    remembered_email: Option<String>,
}

impl CredentialStore {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserResponse> {
        self.user.as_ref()
    }

    pub fn remembered_email(&self) -> Option<&str> {
        self.remembered_email.as_deref()
    }

    pub fn sign_in(&mut self, user: UserResponse, token: String) {
        self.user = Some(user);
        self.token = Some(token);
    }

    pub fn remember_email(&mut self, email: Option<String>) {
        self.remembered_email = email;
    }

    /// Forget the session; the remembered email survives.
    pub fn sign_out(&mut self) {
        self.token = None;
        self.user = None;
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticated GET. Without a token no request is sent.
    pub async fn get_authed<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let token = token.ok_or(ClientError::MissingToken)?;
        let response = self.http.get(self.url(path)).bearer_auth(token).send().await?;
        read_envelope(response).await
    }

    /// Unauthenticated JSON POST.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        read_envelope(response).await
    }
}

/// Unwrap `{success, data, message}`. Non-OK statuses and `success:false`
/// are both failures; the server's message is kept when present.
async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let envelope = serde_json::from_slice::<ApiResponse<T>>(&bytes);

    if !status.is_success() {
        let message = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&bytes)
            .ok()
            .and_then(|e| e.message);
        return Err(ClientError::Status { status, message });
    }

    let envelope = envelope
        .map_err(|e| ClientError::Rejected(format!("Malformed response: {e}")))?;

    if !envelope.success {
        return Err(ClientError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "Request failed".to_string()),
        ));
    }

    envelope
        .data
        .ok_or_else(|| ClientError::Rejected("Response contained no data".to_string()))
}
