//! BlogIt client core.
//!
//! Headless state behind the BlogIt pages: session resolution, the OTP
//! gated register and password-recovery flows, the infinite feed, follow
//! toggles and people search, all talking to the backend through
//! [`api::BlogApi`]. The `blogit-proxy` binary serves the same-origin API
//! proxy from [`proxy`].

pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod follow;
pub mod models;
pub mod navigation;
pub mod otp;
pub mod posts;
pub mod proxy;
pub mod search;
pub mod session;
pub mod users;

pub use crate::api::{BlogApi, HttpGateway};
pub use crate::auth::{AuthContext, AuthState, LoginForm};
pub use crate::core::errors::ClientError;
pub use crate::navigation::{Redirect, Route};
pub use crate::session::SessionStore;
