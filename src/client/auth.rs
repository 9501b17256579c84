//! Login and registration forms.
//!
//! Both validate locally first; an invalid form never reaches the network.

use validator::Validate;

use crate::client::{ApiClient, CredentialStore, Notices};
use crate::errors::{field_messages, FieldErrors};
use crate::models::user::{AuthPayload, LoginUser, RegisterUser};

pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; no request was made.
    Invalid(FieldErrors),
    /// The server refused; the message was raised as an error notice.
    Failed(String),
    /// Session stored; navigate to `redirect`.
    SignedIn { redirect: &'static str },
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub credentials: LoginUser,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: LoginUser {
                email: email.into(),
                password: password.into(),
            },
            remember_me: false,
        }
    }

    /// Empty form with the remembered email filled in, if any.
    pub fn prefilled(store: &CredentialStore) -> Self {
        let mut form = Self::new(store.remembered_email().unwrap_or_default(), "");
        form.remember_me = store.remembered_email().is_some();
        form
    }

    pub async fn submit(
        &self,
        client: &ApiClient,
        store: &mut CredentialStore,
        notices: &mut Notices,
    ) -> SubmitOutcome {
        if let Err(errors) = self.credentials.validate() {
            return SubmitOutcome::Invalid(field_messages(&errors));
        }

        let outcome = submit_auth(
            client,
            LOGIN_PATH,
            &self.credentials,
            store,
            notices,
            "Login successful",
        )
        .await;
        if matches!(outcome, SubmitOutcome::SignedIn { .. }) {
            let remembered = self.remember_me.then(|| self.credentials.email.clone());
            store.remember_email(remembered);
        }
        outcome
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationForm(pub RegisterUser);

impl RegistrationForm {
    pub async fn submit(
        &self,
        client: &ApiClient,
        store: &mut CredentialStore,
        notices: &mut Notices,
    ) -> SubmitOutcome {
        if let Err(errors) = self.0.validate() {
            return SubmitOutcome::Invalid(field_messages(&errors));
        }
        submit_auth(
            client,
            REGISTER_PATH,
            &self.0,
            store,
            notices,
            "Registration successful",
        )
        .await
    }
}

async fn submit_auth<B: serde::Serialize>(
    client: &ApiClient,
    path: &str,
    body: &B,
    store: &mut CredentialStore,
    notices: &mut Notices,
    success_message: &str,
) -> SubmitOutcome {
    match client.post_json::<_, AuthPayload>(path, body).await {
        Ok(payload) => {
            let redirect = payload.user.role.dashboard_path();
            store.sign_in(payload.user, payload.token);
            notices.success(success_message);
            SubmitOutcome::SignedIn { redirect }
        }
        Err(e) => {
            let message = e.user_message();
            tracing::debug!(error = %e, path, "Authentication request failed");
            notices.error(message.clone());
            SubmitOutcome::Failed(message)
        }
    }
}
