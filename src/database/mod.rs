//! Database layer for HobbyVault
//!
//! Handles SQLite database operations including:
//! - Schema creation and upgrades
//! - CRUD operations for users and stored credentials
//! - Encrypted credential storage

pub mod models;
pub mod schema;
pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::Database;
pub use models::*;
