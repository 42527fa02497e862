//! Shoplist Core Business Logic
//!
//! Account lifecycle (signup, sign-in, profile) and the owner-scoped
//! inventory operations, expressed over the database and auth crates.

pub mod accounts;
pub mod error;
pub mod inventory;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use accounts::{AccountService, NewAccount, SessionToken};
pub use error::CoreError;
pub use inventory::{InventoryService, ItemFields};
