//! Core error types
//!
//! Every store and crypto failure is folded into one of these kinds before
//! it leaves the core.

use shoplist_auth::AuthError;
use shoplist_db::DbError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateKey(String),

    #[error("Could not validate credentials")]
    AuthenticationFailed,

    #[error("{0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Machine-stable reason string
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::DuplicateKey(_) => "DUPLICATE_KEY",
            CoreError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            error!("Store unavailable: {}", err);
            return CoreError::StoreUnavailable(err.to_string());
        }

        match err {
            DbError::NotFound(what) => CoreError::NotFound(format!("{} is not found", what)),
            DbError::DuplicateUsername(_) => CoreError::DuplicateKey("User already exists".to_string()),
            DbError::DuplicateEmail(_) => CoreError::DuplicateKey("Email already in use".to_string()),
            DbError::Duplicate(what) => CoreError::DuplicateKey(format!("{} already exists", what)),
            other => {
                error!("Database error: {}", other);
                CoreError::Internal(other.to_string())
            }
        }
    }
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        if err.is_rejection() {
            return CoreError::AuthenticationFailed;
        }
        error!("Auth error: {}", err);
        CoreError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!("Blocking task failed: {}", err);
        CoreError::Internal(err.to_string())
    }
}
