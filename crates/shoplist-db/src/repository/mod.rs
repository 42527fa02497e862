//! Database repository implementation

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

use crate::error::DbError;

// Submodules
mod items;
mod users;

/// Connection settings for the backing store
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// sqlx connection URL, e.g. `sqlite:./data/shoplist.db?mode=rwc`
    pub url: String,
    pub max_connections: u32,
    /// How long a request may wait for a pooled connection
    pub acquire_timeout: Duration,
    /// Upper bound for any single store operation
    pub operation_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            url: "sqlite:./data/shoplist.db?mode=rwc".to_string(),
            max_connections: 8,
            acquire_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(5),
        }
    }
}

/// Row counts reported by `check-db`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: i64,
    pub items: i64,
    pub orphan_items: i64,
}

/// Database connection and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    operation_timeout: Duration,
}

impl Database {
    /// Create a new database connection and run migrations
    pub async fn new(options: &DatabaseOptions) -> Result<Self, DbError> {
        info!("Connecting to database: {}", options.url);

        let connect_options = SqliteConnectOptions::from_str(&options.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(options.operation_timeout / 2);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await?;

        let db = Self {
            pool,
            operation_timeout: options.operation_timeout,
        };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Get the underlying pool for advanced usage
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a store operation under the configured timeout
    ///
    /// Timeouts surface as `DbError::Timeout` and are never retried here.
    pub(crate) async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Database operation '{}' timed out after {:?}", op, self.operation_timeout);
                Err(DbError::Timeout(self.operation_timeout))
            }
        }
    }

    /// Check that the store answers queries
    pub async fn ping(&self) -> Result<(), DbError> {
        self.bounded("ping", async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }

    /// Count rows in each table
    pub async fn table_counts(&self) -> Result<TableCounts, DbError> {
        self.bounded("table_counts", async {
            let row = sqlx::query(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM users) AS users,
                    (SELECT COUNT(*) FROM items) AS items,
                    (SELECT COUNT(*) FROM items WHERE owner IS NULL) AS orphan_items
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

            Ok(TableCounts {
                users: row.try_get("users")?,
                items: row.try_get("items")?,
                orphan_items: row.try_get("orphan_items")?,
            })
        })
        .await
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login TEXT
            )
            "#,
            // owner is nullable only for rows imported before items were scoped
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                price REAL NOT NULL CHECK (price >= 0),
                owner TEXT,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_items_owner ON items(owner)
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_items_owner_name ON items(owner, name)
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::Migration(e.to_string()))?;
        }

        info!("Database migrations completed");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Open a fresh on-disk database; keep the `TempDir` alive for the test
    pub async fn temp_database() -> (Database, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shoplist-test.db");
        let options = DatabaseOptions {
            url: format!("sqlite:{}?mode=rwc", path.display()),
            ..Default::default()
        };
        let db = Database::new(&options).await.unwrap();
        (db, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::temp_database;
    use super::*;
    use crate::models::{NewUser, UserRole};

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let (db, dir) = temp_database().await;
        db.close().await;

        let options = DatabaseOptions {
            url: format!("sqlite:{}?mode=rwc", dir.path().join("shoplist-test.db").display()),
            ..Default::default()
        };
        let reopened = Database::new(&options).await.unwrap();
        reopened.ping().await.unwrap();
        assert_eq!(reopened.table_counts().await.unwrap(), TableCounts::default());
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let (db, _dir) = temp_database().await;
        let db = Database {
            operation_timeout: Duration::from_millis(10),
            ..db
        };

        let result: Result<(), DbError> = db
            .bounded("sleep", async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(DbError::Timeout(_))));
        assert!(result.unwrap_err().is_unavailable());
    }

    #[tokio::test]
    async fn test_write_lock_contention_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let options = DatabaseOptions {
            url: format!("sqlite:{}?mode=rwc", dir.path().join("locked.db").display()),
            operation_timeout: Duration::from_millis(400),
            ..Default::default()
        };
        let db = Database::new(&options).await.unwrap();

        let mut holder = db.pool().acquire().await.unwrap();
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *holder).await.unwrap();

        let result = db
            .insert_user(NewUser {
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::User,
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_unavailable(), "{err:?}");

        sqlx::query("ROLLBACK").execute(&mut *holder).await.unwrap();
    }
}
