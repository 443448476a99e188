//! In-memory session store
//!
//! Sessions are keyed by a random UUID carried in a cookie. Anonymous
//! sessions exist only to carry flash messages (e.g. a failed login).
//! Nothing survives a restart.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

const MAX_TTL_MINUTES: u64 = 365 * 24 * 60;

/// Severity of a one-shot message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Success,
    Error,
}

impl FlashLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Info => "flash-info",
            Self::Success => "flash-success",
            Self::Error => "flash-error",
        }
    }
}

/// Message shown once on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    user_id: Option<i64>,
    expires_at: DateTime<Utc>,
    flash: Vec<Flash>,
}

/// Session lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub token: Uuid,
    pub user_id: Option<i64>,
}

/// Process-wide session table with sliding expiry
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// TTL from configuration, capped at one year.
    pub fn from_minutes(minutes: u64) -> Self {
        let minutes = minutes.min(MAX_TTL_MINUTES) as i64;
        Self::new(Duration::minutes(minutes))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start an authenticated session.
    pub async fn create(&self, user_id: i64) -> Uuid {
        self.insert(Some(user_id)).await
    }

    /// Start a session with no user, used to carry flash messages.
    pub async fn create_anonymous(&self) -> Uuid {
        self.insert(None).await
    }

    async fn insert(&self, user_id: Option<i64>) -> Uuid {
        let token = Uuid::new_v4();
        let session = Session {
            user_id,
            expires_at: Utc::now() + self.ttl,
            flash: Vec::new(),
        };
        self.sessions.write().await.insert(token, session);
        token
    }

    /// Look up a session and extend its expiry. Expired sessions are
    /// dropped and reported as missing.
    pub async fn touch(&self, token: Uuid) -> Option<SessionInfo> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(&token) {
            Some(session) if session.expires_at > now => {
                session.expires_at = now + self.ttl;
                Some(SessionInfo {
                    token,
                    user_id: session.user_id,
                })
            }
            Some(_) => {
                sessions.remove(&token);
                None
            }
            None => None,
        }
    }

    /// Attach a user to an existing session (login from an anonymous one).
    pub async fn login(&self, token: Uuid, user_id: i64) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&token) {
            Some(session) => {
                session.user_id = Some(user_id);
                session.expires_at = Utc::now() + self.ttl;
                true
            }
            None => false,
        }
    }

    pub async fn destroy(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    /// Drop every session of a user (account deleted).
    pub async fn destroy_user(&self, user_id: i64) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != Some(user_id));
        before - sessions.len()
    }

    pub async fn push_flash(&self, token: Uuid, flash: Flash) -> bool {
        match self.sessions.write().await.get_mut(&token) {
            Some(session) => {
                session.flash.push(flash);
                true
            }
            None => false,
        }
    }

    /// Remove and return pending flash messages.
    pub async fn take_flash(&self, token: Uuid) -> Vec<Flash> {
        self.sessions
            .write()
            .await
            .get_mut(&token)
            .map(|s| std::mem::take(&mut s.flash))
            .unwrap_or_default()
    }

    /// Drop expired sessions. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Parse the session token out of a `Cookie` header value.
pub fn token_from_cookie_header(header: &str, cookie_name: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie(cookie_name: &str, token: Uuid) -> String {
    format!("{cookie_name}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_cookie(cookie_name: &str) -> String {
    format!("{cookie_name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_touch_destroy() {
        let store = SessionStore::from_minutes(10);
        let token = store.create(7).await;

        let info = store.touch(token).await.unwrap();
        assert_eq!(info.user_id, Some(7));

        assert!(store.destroy(token).await);
        assert!(store.touch(token).await.is_none());
    }

    #[tokio::test]
    async fn expired_sessions_vanish() {
        let store = SessionStore::new(Duration::seconds(-1));
        let token = store.create(1).await;

        assert!(store.touch(token).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn purge_counts_removed() {
        let store = SessionStore::new(Duration::seconds(-1));
        store.create(1).await;
        store.create_anonymous().await;
        assert_eq!(store.purge_expired().await, 2);
    }

    #[tokio::test]
    async fn flash_is_taken_once() {
        let store = SessionStore::from_minutes(10);
        let token = store.create_anonymous().await;

        assert!(store.push_flash(token, Flash::error("nope")).await);
        assert!(store.push_flash(token, Flash::info("fyi")).await);

        let flashes = store.take_flash(token).await;
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Error);
        assert!(store.take_flash(token).await.is_empty());
    }

    #[tokio::test]
    async fn anonymous_session_can_log_in() {
        let store = SessionStore::from_minutes(10);
        let token = store.create_anonymous().await;
        assert_eq!(store.touch(token).await.unwrap().user_id, None);

        assert!(store.login(token, 3).await);
        assert_eq!(store.touch(token).await.unwrap().user_id, Some(3));
    }

    #[tokio::test]
    async fn destroy_user_drops_all_their_sessions() {
        let store = SessionStore::from_minutes(10);
        store.create(1).await;
        store.create(1).await;
        let other = store.create(2).await;

        assert_eq!(store.destroy_user(1).await, 2);
        assert!(store.touch(other).await.is_some());
    }

    #[test]
    fn cookie_parsing() {
        let token = Uuid::new_v4();
        let header = format!("theme=dark; lms_session={token}; other=1");
        assert_eq!(token_from_cookie_header(&header, "lms_session"), Some(token));
        assert_eq!(token_from_cookie_header("lms_session=garbage", "lms_session"), None);
        assert_eq!(token_from_cookie_header("", "lms_session"), None);
    }

    #[test]
    fn cookie_attributes() {
        let token = Uuid::nil();
        let cookie = session_cookie("lms_session", token);
        assert!(cookie.starts_with("lms_session=00000000-"));
        assert!(cookie.contains("HttpOnly"));
        assert!(clear_cookie("lms_session").contains("Max-Age=0"));
    }
}
