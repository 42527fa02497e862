//! Shoplist REST API
//!
//! This crate provides the Axum-based HTTP surface for Shoplist: account
//! routes under `/users`, the owner-scoped item list under `/list`, health
//! and metrics endpoints, and the embedded web frontend.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
