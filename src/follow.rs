use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::api::BlogApi;
use crate::core::errors::ClientError;

pub const FOLLOW_TOGGLE_FAILED: &str = "Failed to toggle follow status.";

struct FollowState {
    following: bool,
    notification: Option<String>,
}

/// Follow / Unfollow button on another viewer's profile.
///
/// A click flips the local flag before the request goes out. The backend
/// toggle is relative, so every rejected click undoes exactly one flip.
pub struct FollowToggle {
    api: Arc<dyn BlogApi>,
    username: String,
    state: Mutex<FollowState>,
}

impl fmt::Debug for FollowToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowToggle")
            .field("username", &self.username)
            .field("following", &self.is_following())
            .finish()
    }
}

impl FollowToggle {
    pub fn new(api: Arc<dyn BlogApi>, username: impl Into<String>, following: bool) -> Self {
        Self {
            api,
            username: username.into(),
            state: Mutex::new(FollowState { following, notification: None }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FollowState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_following(&self) -> bool {
        self.state().following
    }

    pub fn label(&self) -> &'static str {
        if self.is_following() {
            "Unfollow"
        } else {
            "Follow"
        }
    }

    /// Blocking notice left by the last failed toggle.
    pub fn notification(&self) -> Option<String> {
        self.state().notification.clone()
    }

    pub fn dismiss_notification(&self) {
        self.state().notification = None;
    }

    /// Flip and reconcile. Resolves to the flag shown once this click settles.
    pub async fn click(&self) -> Result<bool, ClientError> {
        {
            let mut st = self.state();
            st.following = !st.following;
            st.notification = None;
        }

        match self.api.toggle_follow(&self.username).await {
            Ok(()) => Ok(self.is_following()),
            Err(err) => {
                warn!(username = %self.username, error = %err, "follow toggle failed");
                let mut st = self.state();
                st.following = !st.following;
                st.notification = Some(FOLLOW_TOGGLE_FAILED.to_string());
                Err(err)
            }
        }
    }
}
