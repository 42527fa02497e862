//! Shoplist Database Layer
//!
//! This crate provides the persistence layer for Shoplist: the credential
//! store for user identities and the owner-scoped item store, both backed
//! by SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{Database, DatabaseOptions, TableCounts};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
