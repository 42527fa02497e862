//! Input validation
//!
//! Runs before any store or crypto work; failures are `CoreError::Validation`.

use crate::error::CoreError;

/// Maximum allowed username length
pub const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed email length
pub const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum allowed password length (prevent DoS with very large passwords)
pub const MAX_PASSWORD_LENGTH: usize = 256;
/// Maximum allowed item name length
pub const MAX_ITEM_NAME_LENGTH: usize = 128;
/// Maximum allowed item category length
pub const MAX_CATEGORY_LENGTH: usize = 64;

/// Validate username format and length
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if username.is_empty() {
        return Err(CoreError::Validation("Username cannot be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    // Only allow alphanumeric characters, underscores, dots and hyphens
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(CoreError::Validation(
            "Username can only contain alphanumeric characters, underscores, dots, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate email shape: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid email address: {}", email));

    if email.is_empty() {
        return Err(CoreError::Validation("Email cannot be empty".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.is_empty() {
        return Err(CoreError::Validation("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Validate the fields of a new item
pub fn validate_item(name: &str, category: &str, quantity: i64, price: f64) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Item name cannot be empty".to_string()));
    }
    if name.len() > MAX_ITEM_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Item name exceeds maximum length of {} characters",
            MAX_ITEM_NAME_LENGTH
        )));
    }
    if category.trim().is_empty() {
        return Err(CoreError::Validation("Item type cannot be empty".to_string()));
    }
    if category.len() > MAX_CATEGORY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Item type exceeds maximum length of {} characters",
            MAX_CATEGORY_LENGTH
        )));
    }
    if quantity < 0 {
        return Err(CoreError::Validation("Quantity must be non-negative".to_string()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::Validation("Price must be a non-negative number".to_string()));
    }
    Ok(())
}
