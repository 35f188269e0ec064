//! Wire types for the backend's cart and user collections.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use supplimax_core::{CartId, CartItem, UserId, UserRole};

/// Timestamp in the format the backend stores: RFC 3339 with milliseconds.
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A cart stored on the backend.
///
/// Fields this storefront does not know about are kept in `extra` and sent
/// back unchanged when the record is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    pub id: CartId,
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartRecord {
    /// The same record with new items and a fresh `updatedAt`.
    #[must_use]
    pub fn with_items(self, items: Vec<CartItem>) -> Self {
        Self {
            items,
            updated_at: Some(timestamp_now()),
            ..self
        }
    }
}

/// Body for creating a cart record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub created_at: String,
    pub updated_at: String,
}

impl NewCart {
    /// A cart for `user_id` stamped with the current time.
    #[must_use]
    pub fn new(user_id: UserId, items: Vec<CartItem>) -> Self {
        let now = timestamp_now();
        Self {
            user_id,
            items,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A storefront account stored on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body for creating a user record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_record_keeps_unknown_fields() {
        let record: CartRecord = serde_json::from_value(json!({
            "id": 3,
            "userId": "u1",
            "items": [],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "couponCode": "SPRING"
        }))
        .unwrap();
        assert_eq!(record.id.as_str(), "3");
        assert_eq!(record.extra.get("couponCode"), Some(&json!("SPRING")));

        let replaced = serde_json::to_value(record.with_items(Vec::new())).unwrap();
        assert_eq!(replaced["couponCode"], json!("SPRING"));
        assert_eq!(replaced["createdAt"], json!("2024-01-01T00:00:00.000Z"));
        assert!(replaced["updatedAt"].is_string());
    }

    #[test]
    fn test_cart_record_without_items() {
        let record: CartRecord =
            serde_json::from_value(json!({ "id": "c1", "userId": 9 })).unwrap();
        assert!(record.items.is_empty());
        assert_eq!(record.user_id.as_str(), "9");
    }

    #[test]
    fn test_user_record_defaults_to_customer() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@b.co"
        }))
        .unwrap();
        assert_eq!(user.role, UserRole::Customer);
        assert!(user.password_hash.is_empty());
    }

    #[test]
    fn test_new_cart_wire_format() {
        let body = serde_json::to_value(NewCart::new(UserId::new("u1"), Vec::new())).unwrap();
        assert_eq!(body["userId"], json!("u1"));
        assert_eq!(body["items"], json!([]));
        assert_eq!(body["createdAt"], body["updatedAt"]);
    }
}
