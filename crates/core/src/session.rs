use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::{decode, ApiClient, RequestError};
use crate::endpoints::Endpoints;
use crate::storage::SessionStorage;
use crate::validation::{validate_credentials, ValidationError};

/// The authenticated identity for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
}

/// Which top-level surface is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Login,
    Dashboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Login {
        email: String,
        password: String,
    },
    Signup {
        name: String,
        email: String,
        password: String,
    },
}

impl Credentials {
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Login {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn signup(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Credentials::Signup {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Credentials::Login { email, password } => validate_credentials(email, password, None),
            Credentials::Signup {
                name,
                email,
                password,
            } => validate_credentials(email, password, Some(name.as_str())),
        }
    }

    fn endpoint(&self, endpoints: &Endpoints) -> String {
        match self {
            Credentials::Login { .. } => endpoints.login(),
            Credentials::Signup { .. } => endpoints.signup(),
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Credentials::Login { email, password } => json!({
                "email": email,
                "password": password,
            }),
            Credentials::Signup {
                name,
                email,
                password,
            } => json!({
                "name": name,
                "email": email,
                "password": password,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    #[serde(alias = "name")]
    user_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Authentication failed. Please try again. ({0})")]
    Request(#[from] RequestError),
    #[error("Not signed in")]
    NotAuthenticated,
}

/// Owns the session token and user identity and drives the login/dashboard switch.
pub struct SessionController {
    client: Arc<dyn ApiClient>,
    endpoints: Endpoints,
    storage: SessionStorage,
    state: SessionState,
}

impl SessionController {
    /// Starts authenticated only when storage holds both a token and a user name.
    pub fn restore(client: Arc<dyn ApiClient>, endpoints: Endpoints, storage: SessionStorage) -> Self {
        let state = match storage.load_session() {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Unauthenticated,
        };
        Self {
            client,
            endpoints,
            storage,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn active_view(&self) -> ActiveView {
        if self.is_authenticated() {
            ActiveView::Dashboard
        } else {
            ActiveView::Login
        }
    }

    /// Validate, authenticate, persist, transition. Any failure leaves the state untouched.
    pub async fn submit(&mut self, credentials: &Credentials) -> Result<Session, AuthError> {
        credentials.validate()?;

        let url = credentials.endpoint(&self.endpoints);
        let response = self.client.post(&url, credentials.body(), None).await?;
        let auth: AuthResponse = decode(&url, response)?;

        let session = Session {
            token: auth.token,
            user_name: auth.user_name,
        };
        if !self.storage.save_session(&session) {
            warn!("session could not be persisted; it will last for this run only");
        }
        info!(user = session.user_name.as_str(), "signed in");
        self.state = SessionState::Authenticated(session.clone());
        Ok(session)
    }

    /// Best-effort server notification, then an unconditional local sign-out.
    pub async fn logout(&mut self) {
        if let SessionState::Authenticated(session) = &self.state {
            let url = self.endpoints.logout();
            if let Err(err) = self
                .client
                .post(&url, json!({}), Some(session.token.as_str()))
                .await
            {
                warn!(error = %err, "logout notification failed");
            }
        }

        if !self.storage.clear_all() {
            warn!("persisted session could not be cleared");
        }
        self.state = SessionState::Unauthenticated;
        info!("signed out");
    }
}
