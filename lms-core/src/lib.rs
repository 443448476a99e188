//! lms-core: domain types and configuration for the LMS
//!
//! Everything the HTTP layer accepts from a user passes through the
//! validated types in [`models`] first.

pub mod config;
pub mod models;

pub use config::LmsConfig;
pub use models::{Role, ValidationError};
