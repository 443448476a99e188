//! lms-server: a small learning management system over HTTP
//!
//! Administrators manage accounts, courses and instructor assignments.
//! Instructors publish materials and assignments and grade submissions.
//! Students enroll, hand in work and read their grades. Pages are rendered
//! on the server; state lives in SQLite and uploads on the local disk.

pub mod db;
pub mod http;
pub mod session;
pub mod state;
pub mod uploads;
pub mod views;

pub use http::{build_router, run_server, ServerConfig, ServerError};
pub use state::AppState;
