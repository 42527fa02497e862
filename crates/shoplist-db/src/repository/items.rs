//! Item operations
//!
//! Every query here takes the owner explicitly; there is no unscoped read.

use chrono::Utc;
use sqlx::Row;
use tracing::{debug, info};

use crate::error::{DbError, unique_violation};
use crate::models::{Item, NewItem};

use super::Database;

impl Database {
    // ==================== Item Operations ====================

    /// Insert a new item for its owner
    ///
    /// The owner is resolved against `users` in the same statement, so an
    /// item can only be written for an identity that exists at write time.
    pub async fn insert_item(&self, item: NewItem) -> Result<Item, DbError> {
        let now = Utc::now();

        self.bounded("insert_item", async move {
            let result = sqlx::query(
                r#"
                INSERT INTO items (name, category, quantity, price, owner, created_at)
                SELECT ?, ?, ?, ?, username, ?
                FROM users
                WHERE username = ?
                RETURNING id
                "#,
            )
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.quantity)
            .bind(item.price)
            .bind(now.to_rfc3339())
            .bind(&item.owner)
            .fetch_optional(&self.pool)
            .await;

            let row = match result {
                Ok(Some(row)) => row,
                Ok(None) => return Err(DbError::NotFound(format!("User: {}", item.owner))),
                Err(e) if unique_violation(&e).is_some() => {
                    return Err(DbError::Duplicate(format!("Item '{}'", item.name)));
                }
                Err(e) => return Err(e.into()),
            };

            let id: i64 = row.try_get("id")?;
            debug!("Inserted item {} for {}", item.name, item.owner);

            Ok(Item {
                id,
                name: item.name,
                category: item.category,
                quantity: item.quantity,
                price: item.price,
                owner: item.owner,
                created_at: now,
            })
        })
        .await
    }

    /// List items belonging to an owner, ordered by name
    pub async fn list_items_by_owner(&self, owner: &str) -> Result<Vec<Item>, DbError> {
        self.bounded("list_items_by_owner", async {
            let rows = sqlx::query(
                r#"
                SELECT id, name, category, quantity, price, owner, created_at
                FROM items
                WHERE owner = ?
                ORDER BY name
                "#,
            )
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

            rows.iter()
                .map(|row| Item::try_from(row).map_err(DbError::from))
                .collect()
        })
        .await
    }

    /// Delete an item by name within an owner's collection
    pub async fn delete_item(&self, owner: &str, name: &str) -> Result<bool, DbError> {
        self.bounded("delete_item", async {
            let result = sqlx::query("DELETE FROM items WHERE owner = ? AND name = ?")
                .bind(owner)
                .bind(name)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
        .await
    }

    /// Assign items without an owner to `owner`
    ///
    /// Rows whose name would collide with an item the owner already has are
    /// left unowned. Returns the number of rows assigned.
    pub async fn assign_orphan_items(&self, owner: &str) -> Result<u64, DbError> {
        self.bounded("assign_orphan_items", async {
            let result = sqlx::query("UPDATE OR IGNORE items SET owner = ? WHERE owner IS NULL")
                .bind(owner)
                .execute(&self.pool)
                .await?;
            let assigned = result.rows_affected();
            info!("Assigned {} orphan items to {}", assigned, owner);
            Ok(assigned)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{NewUser, UserRole};
    use crate::repository::test_support::temp_database;

    use super::*;

    async fn seed_user(db: &Database, username: &str) {
        db.insert_user(NewUser {
            username: username.to_string(),
            email: format!("{}@x.com", username),
            password_hash: "hash".to_string(),
            role: UserRole::User,
        })
        .await
        .unwrap();
    }

    fn new_item(owner: &str, name: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            category: "dairy".to_string(),
            quantity: 2,
            price: 3.5,
            owner: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn test_items_are_scoped_to_owner() {
        let (db, _dir) = temp_database().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        db.insert_item(new_item("alice", "milk")).await.unwrap();
        db.insert_item(new_item("alice", "eggs")).await.unwrap();
        db.insert_item(new_item("bob", "bread")).await.unwrap();

        let alice_items = db.list_items_by_owner("alice").await.unwrap();
        let names: Vec<_> = alice_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["eggs", "milk"]);
        assert!(alice_items.iter().all(|i| i.owner == "alice"));

        let bob_items = db.list_items_by_owner("bob").await.unwrap();
        assert_eq!(bob_items.len(), 1);
        assert_eq!(bob_items[0].name, "bread");
    }

    #[tokio::test]
    async fn test_insert_requires_existing_owner() {
        let (db, _dir) = temp_database().await;

        let result = db.insert_item(new_item("ghost", "milk")).await;
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_same_name_allowed_across_owners_only() {
        let (db, _dir) = temp_database().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        db.insert_item(new_item("alice", "milk")).await.unwrap();
        db.insert_item(new_item("bob", "milk")).await.unwrap();

        let dup = db.insert_item(new_item("alice", "milk")).await;
        assert!(matches!(dup, Err(DbError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_delete_only_touches_own_items() {
        let (db, _dir) = temp_database().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;
        db.insert_item(new_item("alice", "milk")).await.unwrap();

        assert!(!db.delete_item("bob", "milk").await.unwrap());
        assert_eq!(db.list_items_by_owner("alice").await.unwrap().len(), 1);

        assert!(db.delete_item("alice", "milk").await.unwrap());
        assert!(!db.delete_item("alice", "milk").await.unwrap());
        assert!(db.list_items_by_owner("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_assign_orphan_items() {
        let (db, _dir) = temp_database().await;
        seed_user(&db, "alice").await;
        db.insert_item(new_item("alice", "milk")).await.unwrap();

        for name in ["milk", "flour", "sugar"] {
            sqlx::query(
                "INSERT INTO items (name, category, quantity, price, owner, created_at) VALUES (?, 'pantry', 1, 1.0, NULL, ?)",
            )
            .bind(name)
            .bind(Utc::now().to_rfc3339())
            .execute(db.pool())
            .await
            .unwrap();
        }
        assert_eq!(db.table_counts().await.unwrap().orphan_items, 3);

        // "milk" collides with alice's existing item and stays unowned
        assert_eq!(db.assign_orphan_items("alice").await.unwrap(), 2);

        let counts = db.table_counts().await.unwrap();
        assert_eq!(counts.items, 4);
        assert_eq!(counts.orphan_items, 1);
        assert_eq!(db.list_items_by_owner("alice").await.unwrap().len(), 3);
    }
}
