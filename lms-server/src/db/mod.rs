//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - One pool per process; repositories borrow it
//! - List pages use JOINs - no N+1 queries
//! - Rely on UNIQUE constraints, map violations to `DbError::Conflict`
//! - Transactions for multi-step operations

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_memory_pool, create_pool};
pub use repos::*;
