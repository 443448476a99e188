//! Application state shared across handlers

use lms_core::LmsConfig;
use sqlx::SqlitePool;

use crate::session::SessionStore;
use crate::uploads::UploadStore;

/// Shared application state, handed to handlers as `State<Arc<AppState>>`
pub struct AppState {
    pub pool: SqlitePool,
    pub sessions: SessionStore,
    pub uploads: UploadStore,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &LmsConfig) -> Self {
        Self {
            pool,
            sessions: SessionStore::from_minutes(config.session.ttl_minutes),
            uploads: UploadStore::new(config.uploads.dir.clone(), config.uploads.max_bytes),
            cookie_name: config.session.cookie_name.clone(),
        }
    }
}
