//! Route handlers organized by area

pub mod account;
pub mod admin;
pub mod assignments;
pub mod auth;
pub mod courses;
pub mod files;
pub mod health;
