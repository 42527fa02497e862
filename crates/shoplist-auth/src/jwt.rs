//! Session token issuance and verification

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shoplist_db::UserRole;
use tracing::debug;

use crate::error::{AuthError, TokenError};

/// Default session lifetime
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// Algorithm used for every token this deployment issues
const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username of the authenticated identity
    pub username: String,
    /// User role
    pub role: UserRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT manager for token generation and validation
///
/// Holds the process-wide signing secret; cheap to share behind an `Arc`.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl,
        }
    }

    /// Lifetime applied by [`JwtManager::generate_token`]
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Generate a token with the configured lifetime
    pub fn generate_token(&self, username: &str, role: UserRole) -> Result<String, AuthError> {
        self.generate_token_with_ttl(username, role, self.token_ttl)
    }

    /// Generate a token that expires `ttl` from now
    pub fn generate_token_with_ttl(
        &self,
        username: &str,
        role: UserRole,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            username: username.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Generating token for user: {}", username);

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(AuthError::Signing)
    }

    /// Validate a token and return its claims
    ///
    /// The signature is verified before any claim is looked at. A token is
    /// expired once `exp` is reached, not one second after.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?;

        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("test-secret-key", Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    #[test]
    fn test_token_generation_and_validation() {
        let manager = manager();

        let token = manager.generate_token("alice", UserRole::User).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let manager = manager();

        let token = manager
            .generate_token_with_ttl("alice", UserRole::User, Duration::zero())
            .unwrap();
        assert_eq!(manager.validate_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let manager = manager();

        let token = manager
            .generate_token_with_ttl("alice", UserRole::User, Duration::minutes(-5))
            .unwrap();
        assert_eq!(manager.validate_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_invalid_token() {
        let manager = manager();

        assert_eq!(manager.validate_token("invalid-token"), Err(TokenError::Malformed));
        assert_eq!(manager.validate_token(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let issuer = JwtManager::new("other-secret", Duration::minutes(15));
        let token = issuer.generate_token("alice", UserRole::User).unwrap();

        assert_eq!(manager().validate_token(&token), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let manager = manager();
        let token = manager.generate_token("alice", UserRole::User).unwrap();
        let other = manager.generate_token("mallory", UserRole::User).unwrap();

        // Splice mallory's payload onto alice's signature
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(manager.validate_token(&forged), Err(TokenError::SignatureInvalid));
    }
}
