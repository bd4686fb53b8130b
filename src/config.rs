use std::net::SocketAddr;

// === Constants ===
pub const SESSION_COOKIE: &str = "sessionId";
pub const OTP_LENGTH: usize = 6;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const SEARCH_DEBOUNCE_MS: u64 = 500;
pub const FEED_SCROLL_THRESHOLD: f64 = 0.9;
pub const PROXY_PREFIX: &str = "/api/proxy";

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Try again.";

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api/proxy";
const DEFAULT_BACKEND_URL: &str = "http://localhost:4401";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 604_800;
// Browsers cap cookie lifetime at 400 days.
const MAX_SESSION_MAX_AGE_SECS: i64 = 400 * 24 * 60 * 60;

// === Env settings ===

/// Origin every gateway call is made against.
pub fn api_url() -> String {
    std::env::var("BLOGIT_API_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Internal backend the proxy forwards to.
pub fn backend_url() -> String {
    std::env::var("BLOGIT_BACKEND_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

pub fn listen_addr() -> SocketAddr {
    let fallback: SocketAddr = ([0, 0, 0, 0], 3000).into();
    match std::env::var("BLOGIT_LISTEN_ADDR") {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %v, "Invalid BLOGIT_LISTEN_ADDR, using {}", DEFAULT_LISTEN_ADDR);
            fallback
        }),
        Err(_) => fallback,
    }
}

/// Lifetime of the session cookie written on login.
pub fn session_max_age_secs() -> i64 {
    match std::env::var("BLOGIT_SESSION_MAX_AGE_SECS") {
        Ok(v) => v
            .parse::<i64>()
            .ok()
            .filter(|secs| (1..=MAX_SESSION_MAX_AGE_SECS).contains(secs))
            .unwrap_or_else(|| {
                tracing::warn!(value = %v, "Invalid BLOGIT_SESSION_MAX_AGE_SECS, using default");
                DEFAULT_SESSION_MAX_AGE_SECS
            }),
        Err(_) => DEFAULT_SESSION_MAX_AGE_SECS,
    }
}
