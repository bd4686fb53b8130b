//! The `sessionId` cookie, the one place the session token lives.

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

use crate::config::{session_max_age_secs, SESSION_COOKIE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionCookie {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// `Cookie` header value for outgoing requests.
    pub fn header_value(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.token)
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    cookie: RwLock<Option<SessionCookie>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an existing token, as if the cookie survived a reload.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token.into());
        store
    }

    /// Live (non-expired) session cookie.
    pub fn cookie(&self) -> Option<SessionCookie> {
        let guard = self.cookie.read().ok()?;
        guard.as_ref().filter(|c| !c.is_expired(Utc::now())).cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.cookie().map(|c| c.token)
    }

    pub(crate) fn set(&self, token: String) {
        let cookie = SessionCookie {
            token,
            expires_at: expiry_after(Utc::now(), session_max_age_secs()),
        };
        if let Ok(mut guard) = self.cookie.write() {
            *guard = Some(cookie);
        }
    }

    pub(crate) fn clear(&self) {
        if let Ok(mut guard) = self.cookie.write() {
            *guard = None;
        }
    }
}

/// `now + secs`, saturating at the latest representable instant.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    Duration::try_seconds(secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_clear() {
        let store = SessionStore::new();
        assert_eq!(store.token(), None);
        store.set("tok123".into());
        assert_eq!(store.token().as_deref(), Some("tok123"));
        assert_eq!(store.cookie().unwrap().header_value(), "sessionId=tok123");
        store.clear();
        assert_eq!(store.token(), None);
    }

    #[test]
    fn huge_lifetime_saturates() {
        let now = Utc::now();
        assert_eq!(expiry_after(now, 60), now + Duration::seconds(60));
        assert_eq!(expiry_after(now, 9_000_000_000_000_000), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expiry_after(now, i64::MAX), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn expired_cookie_reads_as_absent() {
        let store = SessionStore::new();
        *store.cookie.write().unwrap() = Some(SessionCookie {
            token: "old".into(),
            expires_at: Utc::now() - Duration::seconds(1),
        });
        assert_eq!(store.token(), None);
    }
}
