//! In-process session store for the login gate.
//!
//! A session is an opaque UUIDv4 token carried in the `sid` cookie and
//! mapped to an expiry instant. Presence of an unexpired entry is the
//! entire authenticated state; expired entries are purged lazily on
//! lookup. Nothing survives a process restart, which matches the
//! single-operator deployment this serves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use uuid::Uuid;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sid";

/// Shared session store. Cheap to clone; all clones see the same map.
#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    inner: Arc<Mutex<HashMap<String, Instant>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Session lifetime, for the cookie's `Max-Age`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session and return its token.
    pub fn create(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let expires = Instant::now() + self.ttl;
        if let Ok(mut map) = self.inner.lock() {
            map.insert(token.clone(), expires);
        }
        token
    }

    /// Check a token, purging it if expired.
    pub fn is_valid(&self, token: &str) -> bool {
        let Ok(mut map) = self.inner.lock() else {
            return false;
        };
        match map.get(token) {
            Some(expires) if *expires > Instant::now() => true,
            Some(_) => {
                map.remove(token);
                false
            }
            None => false,
        }
    }

    /// Drop a session (logout). Unknown tokens are a no-op.
    pub fn remove(&self, token: &str) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(token);
        }
    }
}

/// Extract the session token from the request's `Cookie` header(s).
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .find_map(|pair| {
            pair.trim()
                .strip_prefix(SESSION_COOKIE)?
                .strip_prefix('=')
                .map(str::to_owned)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn created_session_is_valid_until_removed() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create();

        assert!(store.is_valid(&token));
        store.remove(&token);
        assert!(!store.is_valid(&token));
    }

    #[test]
    fn unknown_token_is_invalid() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(!store.is_valid("not-a-session"));
    }

    #[test]
    fn expired_session_is_rejected_and_purged() {
        let store = SessionStore::new(Duration::ZERO);
        let token = store.create();

        assert!(!store.is_valid(&token));
        // Purged on first lookup; still invalid afterwards.
        assert!(!store.is_valid(&token));
    }

    #[test]
    fn cookie_parsing_finds_sid_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("theme=dark; sid=abc-123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn cookie_parsing_ignores_prefix_collisions() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("sidebar=open"),
        );
        assert_eq!(session_token(&headers), None);
    }
}
