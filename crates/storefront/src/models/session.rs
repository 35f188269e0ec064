//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use supplimax_core::{UserId, UserRole};

use crate::backend::UserRecord;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Account role.
    #[serde(default)]
    pub role: UserRole,
}

impl CurrentUser {
    /// Up to two uppercase initials from the name, or `U` when there are none.
    #[must_use]
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }

    /// Whether the user may manage products.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.can_manage_products()
    }
}

impl From<UserRecord> for CurrentUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Session keys for authentication and cart data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart of a visitor who is not logged in.
    pub const GUEST_CART: &str = "guest_cart";

    /// Key for the session copy of the logged-in user's cart.
    pub const USER_CART: &str = "user_cart";

    /// Key for a one-shot message shown on the next page.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            name: name.to_string(),
            email: "jo@example.com".to_string(),
            role: UserRole::Customer,
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(user("jane doe").initials(), "JD");
        assert_eq!(user("Ana Maria Lopez").initials(), "AM");
        assert_eq!(user("Cher").initials(), "C");
        assert_eq!(user("   ").initials(), "U");
    }

    #[test]
    fn test_from_record_drops_password_hash() {
        let record = UserRecord {
            id: UserId::new("7"),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::Admin,
            created_at: None,
        };
        let current = CurrentUser::from(record);
        assert!(current.is_admin());
        let json = serde_json::to_string(&current).unwrap_or_default();
        assert!(!json.contains("argon2"));
    }
}
