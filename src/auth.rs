use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::api::BlogApi;
use crate::config::MIN_PASSWORD_LENGTH;
use crate::core::errors::ClientError;
use crate::models::models::{LoginRequest, User};
use crate::navigation::{Redirect, Route};
use crate::session::SessionStore;

const LOGIN_FAILED: &str = "Login failed. Try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub session_id: Option<String>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, session_id: None, loading: true }
    }
}

pub struct AuthContext {
    api: Arc<dyn BlogApi>,
    session: Arc<SessionStore>,
    state: RwLock<AuthState>,
    initialized: AtomicBool,
}

impl AuthContext {
    pub fn new(api: Arc<dyn BlogApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(AuthState::default()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Resolve the viewer from the stored session.
    ///
    /// Only the first call talks to the backend; later calls return the
    /// settled state unchanged.
    pub async fn initialize(&self) -> AuthState {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return self.snapshot();
        }

        let Some(token) = self.session.token() else {
            self.settle(None, None);
            return self.snapshot();
        };

        self.update(|state| state.session_id = Some(token.clone()));

        match self.api.fetch_self().await {
            Ok(user) => {
                info!(username = %user.username, "session verified");
                self.settle(Some(user), Some(token));
            }
            Err(err) => {
                warn!(error = %err, "session verification failed, clearing session");
                self.session.clear();
                self.settle(None, None);
            }
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn user(&self) -> Option<User> {
        self.snapshot().user
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().loading
    }

    /// Exchange credentials for a session and reload into the feed.
    pub async fn login(&self, username: &str, password: &str) -> Result<Redirect, ClientError> {
        let resp = self
            .api
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.session.set(resp.session_id);
        info!(%username, "logged in");
        Ok(Redirect::reload(Route::Home))
    }

    /// Drop the session and reload into the login page.
    pub fn logout(&self) -> Redirect {
        self.session.clear();
        self.settle(None, None);
        info!("logged out");
        Redirect::reload(Route::Login)
    }

    fn settle(&self, user: Option<User>, session_id: Option<String>) {
        self.update(|state| {
            state.user = user;
            state.session_id = session_id;
            state.loading = false;
        });
    }

    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        if let Ok(mut state) = self.state.write() {
            f(&mut state);
        }
    }
}

/// Login page state.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub show_password: bool,
    error: Option<String>,
    loading: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            "Signing in…"
        } else {
            "Sign in"
        }
    }

    pub fn validate(&self) -> Option<&'static str> {
        if self.username.trim().is_empty() {
            return Some("Username is required");
        }
        if self.password.is_empty() {
            return Some("Password is required");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Some("Password must be at least 6 characters");
        }
        None
    }

    pub async fn submit(&mut self, auth: &AuthContext) -> Option<Redirect> {
        self.error = None;
        if let Some(err) = self.validate() {
            self.error = Some(err.to_string());
            return None;
        }

        self.loading = true;
        let outcome = auth.login(&self.username, &self.password).await;
        self.loading = false;

        match outcome {
            Ok(redirect) => Some(redirect),
            Err(err) => {
                warn!(error = %err, "login failed");
                self.error = Some(err.user_message(LOGIN_FAILED));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_validation_order() {
        let mut form = LoginForm::new();
        assert_eq!(form.validate(), Some("Username is required"));
        form.username = "alice".into();
        assert_eq!(form.validate(), Some("Password is required"));
        form.password = "short".into();
        assert_eq!(form.validate(), Some("Password must be at least 6 characters"));
        form.password = "secret1".into();
        assert_eq!(form.validate(), None);
    }

    #[test]
    fn labels_follow_loading() {
        let mut form = LoginForm::new();
        assert_eq!(form.submit_label(), "Sign in");
        form.loading = true;
        assert_eq!(form.submit_label(), "Signing in…");
    }
}
