//! API error types
//!
//! The single place where failures become HTTP responses. Bodies are always
//! `{"detail": ..., "code": ...}`.

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shoplist_auth::AuthError;
use shoplist_core::CoreError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthHeader => ApiError::NotAuthenticated,
            other => ApiError::Core(other.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e {
                CoreError::Validation(_) | CoreError::DuplicateKey(_) => StatusCode::BAD_REQUEST,
                CoreError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotAuthenticated => "AUTHENTICATION_FAILED",
            ApiError::InvalidBody(_) => "VALIDATION_ERROR",
            ApiError::Core(e) => e.code(),
        }
    }

    /// Client-facing message; server faults never expose their cause
    fn detail(&self) -> String {
        match self {
            ApiError::Core(CoreError::StoreUnavailable(_)) => {
                "Service temporarily unavailable".to_string()
            }
            ApiError::Core(CoreError::Internal(_)) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        }

        let body = axum::Json(json!({
            "detail": self.detail(),
            "code": self.code(),
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
