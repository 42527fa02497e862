//! Bearer-token authorization gate

use serde::{Deserialize, Serialize};
use shoplist_db::UserRole;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Authenticated user information
///
/// Built from token claims alone; the credential store is not consulted, so
/// a token stays valid until it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            username: claims.username.clone(),
            role: claims.role,
        }
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                Err(AuthError::InvalidAuthHeader)
            } else {
                Ok(token)
            }
        }
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Resolve the caller from the raw `Authorization` header value
pub fn authorize(header: Option<&str>, jwt: &JwtManager) -> Result<AuthUser, AuthError> {
    let header = header.ok_or(AuthError::MissingAuthHeader)?;
    let token = extract_bearer_token(header)?;

    let claims = jwt.validate_token(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        AuthError::InvalidToken(e)
    })?;

    let user = AuthUser::from_claims(&claims);
    debug!("Authenticated user: {} ({})", user.username, user.role);
    Ok(user)
}
