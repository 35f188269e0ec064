//! User roles.

use serde::{Deserialize, Serialize};

/// Role of a storefront account.
///
/// Stored on the backend user record as a lowercase string. Records without a
/// role are customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

impl UserRole {
    /// Whether the role may use the product administration pages.
    #[must_use]
    pub const fn can_manage_products(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Admin => "Administrator",
        }
    }
}
