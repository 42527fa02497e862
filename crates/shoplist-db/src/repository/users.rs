//! Credential store operations

use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::debug;

use crate::error::{DbError, unique_violation};
use crate::models::{NewUser, User};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Uniqueness of username and email is left to the UNIQUE indexes so two
    /// concurrent signups for the same name cannot both succeed.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        self.bounded("insert_user", async move {
            let result = sqlx::query(
                r#"
                INSERT INTO users (username, email, password_hash, role, created_at, last_login)
                VALUES (?, ?, ?, ?, ?, NULL)
                RETURNING id
                "#,
            )
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(now.to_rfc3339())
            .fetch_one(&self.pool)
            .await;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    return Err(match unique_violation(&e) {
                        Some(msg) if msg.contains("users.email") => {
                            DbError::DuplicateEmail(user.email.clone())
                        }
                        Some(_) => DbError::DuplicateUsername(user.username.clone()),
                        None => DbError::from(e),
                    });
                }
            };

            let id: i64 = row.try_get("id")?;
            debug!("Inserted user {} with id {}", user.username, id);

            Ok(User {
                id,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
                created_at: now,
                last_login: None,
            })
        })
        .await
    }

    /// Get a user by username
    ///
    /// Always a fresh read so sign-in sees the latest password hash.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        self.bounded("get_user_by_username", async {
            let result = sqlx::query(
                r#"
                SELECT id, username, email, password_hash, role, created_at, last_login
                FROM users
                WHERE username = ?
                "#,
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

            Ok(result.map(|row| User::try_from(&row)).transpose()?)
        })
        .await
    }

    /// Get a user by username, failing with `NotFound` when absent
    pub async fn find_user_by_username(&self, username: &str) -> Result<User, DbError> {
        self.get_user_by_username(username)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User: {}", username)))
    }

    /// Record a successful authentication
    ///
    /// Updating a user that does not exist is a no-op; the return value only
    /// reports whether a row was touched.
    pub async fn update_last_login(
        &self,
        username: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        self.bounded("update_last_login", async {
            let result = sqlx::query(
                r#"
                UPDATE users
                SET last_login = ?
                WHERE username = ?
                "#,
            )
            .bind(at.to_rfc3339())
            .bind(username)
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() > 0)
        })
        .await
    }

    /// Earliest registered user, if any
    pub async fn get_first_user(&self) -> Result<Option<User>, DbError> {
        self.bounded("get_first_user", async {
            let result = sqlx::query(
                r#"
                SELECT id, username, email, password_hash, role, created_at, last_login
                FROM users
                ORDER BY id
                LIMIT 1
                "#,
            )
            .fetch_optional(&self.pool)
            .await?;

            Ok(result.map(|row| User::try_from(&row)).transpose()?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::UserRole;
    use crate::repository::test_support::temp_database;

    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$placeholder".to_string(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let (db, _dir) = temp_database().await;

        let created = db.insert_user(new_user("alice", "alice@x.com")).await.unwrap();
        assert_eq!(created.username, "alice");
        assert!(created.last_login.is_none());

        let found = db.find_user_by_username("alice").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "alice@x.com");
        assert_eq!(found.role, UserRole::User);
        assert_eq!(found.password_hash, "$argon2id$v=19$placeholder");
    }

    #[tokio::test]
    async fn test_missing_user() {
        let (db, _dir) = temp_database().await;

        assert!(db.get_user_by_username("ghost").await.unwrap().is_none());
        assert!(matches!(
            db.find_user_by_username("ghost").await,
            Err(DbError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let (db, _dir) = temp_database().await;
        db.insert_user(new_user("alice", "alice@x.com")).await.unwrap();

        let dup_name = db.insert_user(new_user("alice", "other@x.com")).await;
        assert!(matches!(dup_name, Err(DbError::DuplicateUsername(ref u)) if u == "alice"));

        let dup_email = db.insert_user(new_user("bob", "ALICE@x.com")).await;
        assert!(matches!(dup_email, Err(DbError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_concurrent_signups_yield_one_winner() {
        let (db, _dir) = temp_database().await;

        let mut handles = Vec::new();
        for i in 0..4 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                db.insert_user(new_user("carol", &format!("carol{}@x.com", i)))
                    .await
            }));
        }

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(DbError::DuplicateUsername(_)) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(duplicates, 3);
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let (db, _dir) = temp_database().await;
        db.insert_user(new_user("alice", "alice@x.com")).await.unwrap();

        let at = Utc::now();
        assert!(db.update_last_login("alice", at).await.unwrap());
        assert!(db.update_last_login("alice", at).await.unwrap());

        let user = db.find_user_by_username("alice").await.unwrap();
        assert_eq!(user.last_login.unwrap().timestamp(), at.timestamp());

        // Unknown users are a silent no-op
        assert!(!db.update_last_login("ghost", at).await.unwrap());
    }

    #[tokio::test]
    async fn test_first_user() {
        let (db, _dir) = temp_database().await;
        assert!(db.get_first_user().await.unwrap().is_none());

        db.insert_user(new_user("zed", "zed@x.com")).await.unwrap();
        db.insert_user(new_user("amy", "amy@x.com")).await.unwrap();
        assert_eq!(db.get_first_user().await.unwrap().unwrap().username, "zed");
    }
}
