//! HTTP layer
//!
//! Axum server with:
//! - Request tracing and timeouts
//! - Cookie sessions with role-guarded extractors
//! - HTML error pages
//! - Graceful shutdown

pub mod access;
pub mod error;
pub mod extractors;
pub mod flash;
pub mod multipart;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{bootstrap_admin, build_router, run_server, ServerConfig, ServerError};
