use std::sync::Arc;

use thiserror::Error;

use crate::adapter::{ClientError, Operation, RestAdapter};
use crate::session::{Session, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("login response carried an empty access token")]
    EmptyToken,

    #[error("could not store session: {0}")]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Message for the login screen.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Client(err) => err.user_message().to_string(),
            AuthError::EmptyToken => Operation::Login.failure_message().to_string(),
            AuthError::Session(err) => format!("Login failed: {err}"),
        }
    }
}

/// Login/logout transitions over the shared session.
///
/// `Anonymous -> Authenticated` only on a successful login response;
/// `Authenticated -> Anonymous` only on explicit logout.
pub struct AuthFlow {
    adapter: Arc<RestAdapter>,
    session: Arc<Session>,
}

impl AuthFlow {
    pub fn new(adapter: Arc<RestAdapter>, session: Arc<Session>) -> Self {
        Self { adapter, session }
    }

    /// Derived from the session, so a restored token starts `Authenticated`.
    pub fn state(&self) -> AuthState {
        if self.session.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthState, AuthError> {
        let response = self.adapter.login(username, password).await.map_err(|err| {
            tracing::warn!(error = %err, "login failed");
            err
        })?;

        if response.access_token.trim().is_empty() {
            tracing::warn!(%username, "login response without a token");
            return Err(AuthError::EmptyToken);
        }

        self.session.login(response.access_token)?;
        tracing::info!(%username, "logged in");
        Ok(AuthState::Authenticated)
    }

    pub fn logout(&self) -> Result<AuthState, AuthError> {
        self.session.logout()?;
        Ok(AuthState::Anonymous)
    }
}
