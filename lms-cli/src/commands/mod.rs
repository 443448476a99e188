//! Command implementations for the lms CLI

pub mod serve;
pub mod user;

pub use serve::run_serve;
pub use user::run_user;

use anyhow::Result;
use lms_core::LmsConfig;

/// Load config and apply a `--database-url` flag on top.
pub(crate) fn load_config(database_url: Option<String>) -> Result<LmsConfig> {
    let mut config = LmsConfig::load()?;
    if let Some(url) = database_url {
        config.database.url = url;
    }
    Ok(config)
}
