use std::sync::Arc;

use chrono::Duration;
use shoplist_auth::JwtManager;
use shoplist_db::{Database, DatabaseOptions, User};
use tempfile::TempDir;

use crate::accounts::{AccountService, NewAccount};
use crate::error::CoreError;

pub async fn accounts_with_db() -> (AccountService, Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let options = DatabaseOptions {
        url: format!("sqlite:{}?mode=rwc", dir.path().join("core-test.db").display()),
        ..Default::default()
    };
    let db = Database::new(&options).await.unwrap();
    let jwt = Arc::new(JwtManager::new("core-test-secret", Duration::minutes(15)));
    (AccountService::new(db.clone(), jwt), db, dir)
}

pub async fn accounts() -> (AccountService, TempDir) {
    let (service, _db, dir) = accounts_with_db().await;
    (service, dir)
}

pub async fn signup(
    service: &AccountService,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, CoreError> {
    service
        .signup(NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
}
