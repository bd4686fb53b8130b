use async_trait::async_trait;
use http::StatusCode;
use std::sync::Arc;
use tracing::warn;

use crate::api::{ApiResult, BlogApi};
use crate::config::MIN_PASSWORD_LENGTH;
use crate::core::errors::ClientError;
use crate::core::helpers::is_email_shaped;
use crate::core::query_params::{get_bool_flag, get_string, parse_query_params};
use crate::follow::FollowToggle;
use crate::models::models::*;
use crate::navigation::{Redirect, Route};
use crate::otp::{OtpAction, OtpFlow};
use crate::posts::Composer;

// === Registration ===

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFields {
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct RegisterAction;

pub type RegisterFlow = OtpFlow<RegisterAction>;

pub fn register_flow(api: Arc<dyn BlogApi>) -> RegisterFlow {
    OtpFlow::new(RegisterAction, api)
}

#[async_trait]
impl OtpAction for RegisterAction {
    type Fields = RegisterFields;

    fn validate(&self, f: &RegisterFields) -> Result<(), String> {
        let err = if f.display_name.trim().is_empty() {
            "Display name is required"
        } else if f.username.trim().is_empty() {
            "Username is required"
        } else if f.email.trim().is_empty() {
            "Email is required"
        } else if !is_email_shaped(&f.email) {
            "Enter a valid email address"
        } else if f.password.is_empty() {
            "Password is required"
        } else if f.password.chars().count() < MIN_PASSWORD_LENGTH {
            "Password must be at least 6 characters"
        } else if f.confirm_password != f.password {
            "Passwords do not match"
        } else {
            return Ok(());
        };
        Err(err.to_string())
    }

    async fn request_otp(&self, api: &dyn BlogApi, f: &RegisterFields) -> ApiResult<()> {
        api.request_register_otp(&RegisterOtpRequest {
            username: f.username.clone(),
            email: f.email.clone(),
        })
        .await
    }

    fn request_failure_message(&self, err: &ClientError) -> String {
        if err.status() == Some(StatusCode::BAD_REQUEST) {
            return "User with this username already exists.".to_string();
        }
        err.user_message("Error Sending OTP.")
    }

    async fn verify(&self, api: &dyn BlogApi, f: &RegisterFields, code: &str) -> ApiResult<Redirect> {
        api.verify_register_otp(&RegisterVerifyRequest {
            username: f.username.clone(),
            email: f.email.clone(),
            display_name: f.display_name.clone(),
            password: f.password.clone(),
            otp_code: code.to_string(),
        })
        .await?;
        Ok(Redirect::push(Route::Login))
    }
}

// === Password recovery ===

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordFields {
    pub username: String,
}

pub struct ForgotPasswordAction;

pub type ForgotPasswordFlow = OtpFlow<ForgotPasswordAction>;

pub fn forgot_password_flow(api: Arc<dyn BlogApi>) -> ForgotPasswordFlow {
    OtpFlow::new(ForgotPasswordAction, api)
}

#[async_trait]
impl OtpAction for ForgotPasswordAction {
    type Fields = ForgotPasswordFields;

    fn validate(&self, f: &ForgotPasswordFields) -> Result<(), String> {
        if f.username.trim().is_empty() {
            return Err("Username is required".to_string());
        }
        Ok(())
    }

    async fn request_otp(&self, api: &dyn BlogApi, f: &ForgotPasswordFields) -> ApiResult<()> {
        api.request_password_otp(&ForgotPasswordRequest { username: f.username.clone() })
            .await
    }

    fn request_failure_message(&self, err: &ClientError) -> String {
        err.user_message("Request failed. Try again.")
    }

    async fn verify(
        &self,
        api: &dyn BlogApi,
        f: &ForgotPasswordFields,
        code: &str,
    ) -> ApiResult<Redirect> {
        let resp = api
            .verify_password_otp(&ForgotPasswordVerifyRequest {
                username: f.username.clone(),
                otp_code: code.to_string(),
            })
            .await?;
        Ok(Redirect::push(Route::ResetPassword { reset_token: resp.reset_token }))
    }
}

/// Final step of recovery, reached with `?resetToken=` in the location.
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm: String,
    pub show_password: bool,
    token: String,
    error: Option<String>,
    loading: bool,
    success: bool,
}

impl ResetPasswordForm {
    pub fn from_location(location: &str) -> Self {
        let params = parse_query_params(location);
        Self {
            token: get_string(&params, "resetToken").unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn success_message(&self) -> Option<&'static str> {
        self.success.then_some("Password updated. Redirecting to login…")
    }

    pub fn validate(&self) -> Option<&'static str> {
        if self.password.is_empty() {
            return Some("Password is required");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Some("Password must be at least 6 characters");
        }
        if self.confirm.is_empty() {
            return Some("Please confirm your password");
        }
        if self.password != self.confirm {
            return Some("Passwords do not match");
        }
        if self.token.is_empty() {
            return Some("Missing reset token");
        }
        None
    }

    pub async fn submit(&mut self, api: &dyn BlogApi) -> Option<Redirect> {
        self.error = None;
        if let Some(err) = self.validate() {
            self.error = Some(err.to_string());
            return None;
        }

        self.loading = true;
        let outcome = api
            .reset_password(&ResetPasswordRequest {
                reset_token: self.token.clone(),
                new_password: self.password.clone(),
            })
            .await;
        self.loading = false;

        match outcome {
            Ok(()) => {
                self.success = true;
                Some(Redirect::reload(Route::Login))
            }
            Err(err) => {
                warn!(error = %err, "password reset failed");
                self.error = Some(err.user_message("Failed to reset password"));
                None
            }
        }
    }
}

// === Profiles ===

#[derive(Debug)]
pub enum ProfileLoad {
    Found(ProfileView),
    NotFound,
}

/// A loaded profile page, seen by an optional viewer.
#[derive(Debug)]
pub struct ProfileView {
    pub username: String,
    pub display_name: String,
    pub follower_count: u64,
    pub following_count: u64,
    /// Present only when a viewer looks at somebody else's profile.
    pub follow: Option<FollowToggle>,
    /// Present only on the viewer's own profile.
    pub composer: Option<Composer>,
    posts: Vec<Post>,
}

impl ProfileView {
    /// Fetch `/profile/:username`. A 404 becomes [`ProfileLoad::NotFound`];
    /// every other failure is returned as an error.
    pub async fn load(
        api: Arc<dyn BlogApi>,
        username: &str,
        viewer: Option<&User>,
    ) -> Result<ProfileLoad, ClientError> {
        let profile = match api.profile(username).await {
            Ok(profile) => profile,
            Err(err) if err.is_not_found() => return Ok(ProfileLoad::NotFound),
            Err(err) => return Err(err),
        };
        Ok(ProfileLoad::Found(Self::from_profile(api, profile, viewer)))
    }

    pub fn from_profile(api: Arc<dyn BlogApi>, profile: Profile, viewer: Option<&User>) -> Self {
        let own = viewer.map(|v| v.username == profile.username).unwrap_or(false);
        let follow = match viewer {
            Some(_) if !own => Some(FollowToggle::new(
                api.clone(),
                profile.username.clone(),
                profile.is_following,
            )),
            _ => None,
        };
        let composer = own.then(|| Composer::new(api));

        Self {
            username: profile.username,
            display_name: profile.display_name,
            follower_count: profile.followers.count(),
            following_count: profile.following.count(),
            follow,
            composer,
            posts: profile.posts,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn is_own(&self) -> bool {
        self.composer.is_some()
    }

    /// Open the share box when the location asks for it (`?postbox=true`).
    pub fn apply_location(&mut self, location: &str) {
        if get_bool_flag(&parse_query_params(location), "postbox") {
            if let Some(composer) = self.composer.as_mut() {
                composer.open();
            }
        }
    }

    /// Share the composer draft; the new post goes to the top of the list.
    pub async fn share(&mut self) -> bool {
        let Some(composer) = self.composer.as_mut() else {
            return false;
        };
        match composer.submit().await {
            Some(post) => {
                self.posts.insert(0, post);
                true
            }
            None => false,
        }
    }

    pub fn empty_hint(&self) -> Option<String> {
        self.posts.is_empty().then(|| {
            format!("When {} shares posts, they'll appear here.", self.display_name)
        })
    }
}
