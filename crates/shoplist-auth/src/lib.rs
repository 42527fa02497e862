//! Shoplist Authentication and Authorization
//!
//! This crate provides Argon2 password hashing, HS256 session tokens and
//! the bearer-token gate that resolves the caller's identity.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::{AuthError, TokenError};
pub use jwt::{Claims, DEFAULT_TOKEN_TTL_MINUTES, JwtManager};
pub use middleware::{AuthUser, authorize, extract_bearer_token};
pub use password::{hash_password, verify_password, verify_password_or_dummy};
