//! Account lifecycle: signup, sign-in and profile lookup

use std::sync::Arc;

use chrono::Utc;
use shoplist_auth::{AuthUser, JwtManager, hash_password, verify_password_or_dummy};
use shoplist_db::{Database, NewUser, User, UserRole};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::validation::{validate_email, validate_password, validate_username};

/// Signup input
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Account operations over the credential store
#[derive(Clone)]
pub struct AccountService {
    db: Database,
    jwt: Arc<JwtManager>,
}

impl AccountService {
    pub fn new(db: Database, jwt: Arc<JwtManager>) -> Self {
        Self { db, jwt }
    }

    /// Register a new identity with the default role
    pub async fn signup(&self, account: NewAccount) -> Result<User, CoreError> {
        validate_username(&account.username)?;
        validate_email(&account.email)?;
        validate_password(&account.password)?;

        debug!("Signing up user: {}", account.username);

        let password = account.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let user = self
            .db
            .insert_user(NewUser {
                username: account.username,
                email: account.email,
                password_hash,
                role: UserRole::default(),
            })
            .await?;

        info!("Created user: {}", user.username);
        Ok(user)
    }

    /// Check credentials and mint a session token
    ///
    /// Unknown usernames and wrong passwords fail identically, including the
    /// time spent verifying.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SessionToken, CoreError> {
        if username.is_empty() || password.is_empty() {
            return Err(CoreError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        debug!("Sign-in attempt for user: {}", username);

        let user = self.db.get_user_by_username(username).await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let candidate = password.to_string();
        let valid = tokio::task::spawn_blocking(move || {
            verify_password_or_dummy(&candidate, stored_hash.as_deref())
        })
        .await?;

        let user = match (user, valid) {
            (Some(user), true) => user,
            _ => {
                warn!("Failed sign-in attempt");
                return Err(CoreError::AuthenticationFailed);
            }
        };

        self.db.update_last_login(&user.username, Utc::now()).await?;

        let access_token = self.jwt.generate_token(&user.username, user.role)?;

        info!("User {} signed in", user.username);

        Ok(SessionToken {
            access_token,
            token_type: "bearer",
            expires_in: self.jwt.token_ttl().num_seconds(),
        })
    }

    /// Profile of the authenticated caller
    ///
    /// `NotFound` if the identity vanished after the token was issued.
    pub async fn profile(&self, caller: &AuthUser) -> Result<User, CoreError> {
        Ok(self.db.find_user_by_username(&caller.username).await?)
    }
}
