use crate::core::query_params::build_query;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    ForgotPassword,
    ResetPassword { reset_token: String },
    Profile { username: String },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgotpassword".to_string(),
            Route::ResetPassword { reset_token } => {
                format!("/resetPassword?{}", build_query(&[("resetToken", reset_token)]))
            }
            Route::Profile { username } => format!("/{}", urlencoding::encode(username)),
        }
    }
}

/// Where a finished action sends the viewer.
///
/// `full_reload` drops all in-memory state, so the auth context resolves
/// again on the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub route: Route,
    pub full_reload: bool,
}

impl Redirect {
    pub fn push(route: Route) -> Self {
        Self { route, full_reload: false }
    }

    pub fn reload(route: Route) -> Self {
        Self { route, full_reload: true }
    }

    pub fn path(&self) -> String {
        self.route.path()
    }
}
