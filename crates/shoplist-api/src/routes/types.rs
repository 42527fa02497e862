//! Request/Response DTOs

use serde::{Deserialize, Serialize};
use shoplist_db::{Item, User};

// ==================== User Types ====================

/// Signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Sign-in form (`application/x-www-form-urlencoded`)
#[derive(Deserialize)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
}

/// Sign-in response
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Profile response (never carries the password hash)
#[derive(Serialize, Debug, PartialEq)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            role: user.role.as_str().to_string(),
            created_at: user.created_at.to_rfc3339(),
            last_login: user.last_login.map(|t| t.to_rfc3339()),
        }
    }
}

/// Plain confirmation message
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== Item Types ====================

/// Add item request
///
/// Unknown fields such as `owner` are ignored; the owner always comes from
/// the token.
#[derive(Deserialize)]
pub struct ItemRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub quantity: i64,
    pub price: f64,
}

/// Item response
#[derive(Serialize)]
pub struct ItemResponse {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub quantity: i64,
    pub price: f64,
    pub owner: String,
    pub created_at: String,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            name: item.name,
            category: item.category,
            quantity: item.quantity,
            price: item.price,
            owner: item.owner,
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

/// Item removal confirmation
#[derive(Serialize)]
pub struct DeleteResponse {
    pub msg: String,
}
