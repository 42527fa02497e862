//! Owner-scoped inventory operations
//!
//! The caller's identity decides which rows are visible. An item owned by
//! someone else is reported exactly like a missing one.

use shoplist_auth::AuthUser;
use shoplist_db::{Database, Item, NewItem};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::validation::validate_item;

/// Client-supplied item fields; the owner is never taken from the client
#[derive(Debug, Clone)]
pub struct ItemFields {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub price: f64,
}

/// Inventory operations bound to the caller's identity
#[derive(Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Items owned by the caller
    pub async fn list(&self, caller: &AuthUser) -> Result<Vec<Item>, CoreError> {
        Ok(self.db.list_items_by_owner(&caller.username).await?)
    }

    /// Add an item owned by the caller
    pub async fn add(&self, caller: &AuthUser, fields: ItemFields) -> Result<Item, CoreError> {
        validate_item(&fields.name, &fields.category, fields.quantity, fields.price)?;

        debug!("Adding item {} for {}", fields.name, caller.username);

        let item = self
            .db
            .insert_item(NewItem {
                name: fields.name,
                category: fields.category,
                quantity: fields.quantity,
                price: fields.price,
                owner: caller.username.clone(),
            })
            .await?;

        info!("User {} added item {}", caller.username, item.name);
        Ok(item)
    }

    /// Delete one of the caller's items by name
    pub async fn delete_by_name(&self, caller: &AuthUser, name: &str) -> Result<(), CoreError> {
        if self.db.delete_item(&caller.username, name).await? {
            info!("User {} removed item {}", caller.username, name);
            Ok(())
        } else {
            Err(CoreError::NotFound(format!("Item with Name={} is not found", name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use shoplist_db::UserRole;

    use super::*;
    use crate::test_support::{accounts_with_db, signup};

    fn caller(username: &str) -> AuthUser {
        AuthUser {
            username: username.to_string(),
            role: UserRole::User,
        }
    }

    fn milk() -> ItemFields {
        ItemFields {
            name: "milk".to_string(),
            category: "dairy".to_string(),
            quantity: 2,
            price: 3.5,
        }
    }

    #[tokio::test]
    async fn test_add_forces_owner_and_lists_own_items() {
        let (accounts, db, _dir) = accounts_with_db().await;
        signup(&accounts, "alice", "alice@x.com", "pw1").await.unwrap();
        signup(&accounts, "bob", "bob@x.com", "pw2").await.unwrap();
        let inventory = InventoryService::new(db);

        assert!(inventory.list(&caller("alice")).await.unwrap().is_empty());

        let item = inventory.add(&caller("alice"), milk()).await.unwrap();
        assert_eq!(item.owner, "alice");
        assert_eq!(item.category, "dairy");

        assert_eq!(inventory.list(&caller("alice")).await.unwrap(), vec![item]);
        assert!(inventory.list(&caller("bob")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_of_foreign_item_is_not_found() {
        let (accounts, db, _dir) = accounts_with_db().await;
        signup(&accounts, "alice", "alice@x.com", "pw1").await.unwrap();
        signup(&accounts, "bob", "bob@x.com", "pw2").await.unwrap();
        let inventory = InventoryService::new(db);
        inventory.add(&caller("alice"), milk()).await.unwrap();

        let foreign = inventory.delete_by_name(&caller("bob"), "milk").await;
        let missing = inventory.delete_by_name(&caller("bob"), "caviar").await;
        assert!(matches!(foreign, Err(CoreError::NotFound(_))));
        assert!(matches!(missing, Err(CoreError::NotFound(_))));

        inventory.delete_by_name(&caller("alice"), "milk").await.unwrap();
        assert!(inventory.list(&caller("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_fields_and_unknown_owner() {
        let (accounts, db, _dir) = accounts_with_db().await;
        signup(&accounts, "alice", "alice@x.com", "pw1").await.unwrap();
        let inventory = InventoryService::new(db);

        let negative = ItemFields { quantity: -1, ..milk() };
        assert!(matches!(
            inventory.add(&caller("alice"), negative).await,
            Err(CoreError::Validation(_))
        ));

        assert!(matches!(
            inventory.add(&caller("ghost"), milk()).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name_for_same_owner() {
        let (accounts, db, _dir) = accounts_with_db().await;
        signup(&accounts, "alice", "alice@x.com", "pw1").await.unwrap();
        let inventory = InventoryService::new(db);

        inventory.add(&caller("alice"), milk()).await.unwrap();
        assert!(matches!(
            inventory.add(&caller("alice"), milk()).await,
            Err(CoreError::DuplicateKey(_))
        ));
    }
}
