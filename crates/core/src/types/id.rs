//! Newtype IDs for type-safe entity references.
//!
//! The REST backend assigns ids itself and is not consistent about their JSON
//! type: some records carry string ids, others numeric ones. Every id here is
//! held as a string and deserializes from either form.

use serde::{Deserialize, Deserializer};

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]`
/// - `Deserialize` accepting JSON strings and integers
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `as_str()`, `into_inner()`
/// - `Display`, `From<String>` and `From<&str>`
///
/// # Example
///
/// ```rust
/// # use supplimax_core::define_id;
/// define_id!(OrderId);
/// define_id!(ReviewId);
///
/// let order_id = OrderId::new("42");
/// let review_id = ReviewId::new("42");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = review_id;
/// assert_eq!(order_id.as_str(), review_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_id(deserializer).map(Self)
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(UserId);
define_id!(CartId);

/// Wire representation of an id: a string or an integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

/// Deserialize an id from a JSON string or integer.
///
/// Used by [`define_id!`]; not intended to be called directly.
///
/// # Errors
///
/// Returns the deserializer's error if the value is neither a string nor an integer.
#[doc(hidden)]
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match WireId::deserialize(deserializer)? {
        WireId::Text(s) => s,
        WireId::Signed(n) => n.to_string(),
        WireId::Unsigned(n) => n.to_string(),
    })
}

impl ProductId {
    /// Prefix for ids assigned locally to records the backend sent without one.
    pub const PLACEHOLDER_PREFIX: &'static str = "temp-";

    /// Build the placeholder id for the record at `index` in a listing.
    ///
    /// Placeholders are 1-based: the first record gets `temp-1`.
    #[must_use]
    pub fn placeholder(index: usize) -> Self {
        Self(format!("{}{}", Self::PLACEHOLDER_PREFIX, index + 1))
    }

    /// Whether this id is a local placeholder rather than a backend id.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.contains(Self::PLACEHOLDER_PREFIX)
    }
}
