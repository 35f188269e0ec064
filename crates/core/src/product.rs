//! Product records.
//!
//! The backend owns the product schema and does not enforce it: fields go
//! missing, arrive as `null`, or carry the wrong JSON type. [`RawProduct`]
//! accepts anything that parses as a JSON object, and [`Product::from_raw`]
//! fills every gap with a default so the rest of the storefront works with a
//! complete record.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Price, ProductId};

/// Size used when a record carries none.
pub const DEFAULT_SIZE: &str = "One Size";

/// Label for records without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Label for records without a name.
pub const UNNAMED: &str = "Unnamed Product";

/// Number of stars in a rating display.
pub const MAX_STARS: u8 = 5;

/// A product record exactly as the backend sent it.
///
/// Every field is optional. Values of the wrong type, `null`, empty strings,
/// `false` and zero all read as "absent" so that defaults apply the same way
/// for each of them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "lenient::id")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cost: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity_in_stock: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub rating: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub on_sale: Option<bool>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub discount_percentage: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_new_arrival: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: Option<String>,
    /// Kept as sent, including an explicit `false`, because it overrides the
    /// stock-count default.
    #[serde(default, deserialize_with = "lenient::explicit_flag")]
    pub is_in_stock: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_exclusive: Option<bool>,
}

/// A complete product record.
///
/// Serializes to the backend's camelCase wire format, with money as JSON
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub cost: Decimal,
    pub description: String,
    pub image_url: String,
    pub quantity_in_stock: u32,
    pub size: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub rating: Decimal,
    pub color: String,
    pub on_sale: bool,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount_percentage: Decimal,
    pub is_new_arrival: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_in_stock: bool,
    pub is_featured: bool,
    pub is_exclusive: bool,
}

impl Product {
    /// Build a complete product from a backend record.
    ///
    /// `index` is the record's position in the listing it came from and only
    /// matters when the record has neither `id` nor `_id`: it then receives the
    /// placeholder id `temp-{index + 1}`.
    #[must_use]
    pub fn from_raw(raw: RawProduct, index: usize) -> Self {
        let id = raw
            .id
            .or(raw.object_id)
            .map_or_else(|| ProductId::placeholder(index), ProductId::from);
        let quantity_in_stock = raw.quantity_in_stock.unwrap_or(0);

        Self {
            id,
            name: raw.name.unwrap_or_default(),
            price: raw.price.unwrap_or_default(),
            cost: raw.cost.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            image_url: raw.image_url.unwrap_or_default(),
            quantity_in_stock,
            size: raw.size.unwrap_or_else(|| DEFAULT_SIZE.to_string()),
            rating: raw.rating.unwrap_or_default(),
            color: raw.color.unwrap_or_default(),
            on_sale: raw.on_sale.unwrap_or(false),
            discount_percentage: raw.discount_percentage.unwrap_or_default(),
            is_new_arrival: raw.is_new_arrival.unwrap_or(false),
            category: raw.category,
            is_in_stock: raw.is_in_stock.unwrap_or(quantity_in_stock > 0),
            is_featured: raw.is_featured.unwrap_or(false),
            is_exclusive: raw.is_exclusive.unwrap_or(false),
        }
    }

    /// Normalize a whole listing, assigning placeholder ids by position.
    #[must_use]
    pub fn from_listing(records: Vec<RawProduct>) -> Vec<Self> {
        records
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Self::from_raw(raw, index))
            .collect()
    }

    /// Whether the product carries a real backend id and can be linked to.
    #[must_use]
    pub fn has_valid_id(&self) -> bool {
        !self.id.as_str().is_empty() && !self.id.is_placeholder()
    }

    /// Name for display, falling back to a generic label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNNAMED
        } else {
            &self.name
        }
    }

    /// Category for display, falling back to a generic label.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    /// Whether the product is in the given category, ignoring case.
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == category.to_lowercase())
    }

    /// Current selling price.
    #[must_use]
    pub const fn selling_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Pre-discount price implied by the discount percentage.
    ///
    /// `None` unless the discount is strictly between 0 and 100 percent.
    #[must_use]
    pub fn compare_at_price(&self) -> Option<Price> {
        let hundred = Decimal::ONE_HUNDRED;
        let discount = self.discount_percentage;
        if discount <= Decimal::ZERO || discount >= hundred {
            return None;
        }
        let remaining = Decimal::ONE - discount / hundred;
        self.price.checked_div(remaining).map(Price::usd)
    }

    /// Discount percentage without trailing zeros, e.g. `15` or `12.5`.
    #[must_use]
    pub fn discount_label(&self) -> String {
        self.discount_percentage.normalize().to_string()
    }

    /// Number of filled stars: the rating rounded down, within `0..=5`.
    #[must_use]
    pub fn filled_stars(&self) -> u8 {
        self.rating
            .floor()
            .to_u8()
            .unwrap_or(0)
            .min(MAX_STARS)
    }
}

/// Tolerant field deserializers for [`RawProduct`].
mod lenient {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    /// Non-empty strings and integers; `{"$oid": "..."}` objects yield the inner id.
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(super::id_from_value(&value(deserializer)?))
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match value(deserializer)? {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
    }

    /// Numbers and numeric strings; zero reads as absent.
    pub fn decimal<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        let parsed = match value(deserializer)? {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s.trim()),
            _ => None,
        };
        Ok(parsed.filter(|d| !d.is_zero()))
    }

    fn parse_decimal(s: &str) -> Option<Decimal> {
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .ok()
    }

    /// Non-negative whole numbers; fractions are truncated.
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        Ok(match value(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f.trunc() as u64)
                })
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0),
            _ => None,
        })
    }

    /// Booleans where `false` reads as absent.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        Ok(match value(deserializer)? {
            Value::Bool(true) => Some(true),
            _ => None,
        })
    }

    /// Booleans kept as sent.
    pub fn explicit_flag<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        Ok(match value(deserializer)? {
            Value::Bool(b) => Some(b),
            _ => None,
        })
    }
}

/// Extract an id from a JSON value: non-empty strings, integers, and
/// `{"$oid": "..."}` objects.
#[must_use]
pub fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(id_from_value),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(value: Value) -> Product {
        Product::from_raw(serde_json::from_value(value).unwrap(), 0)
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let p = product(json!({ "id": "p1" }));
        assert_eq!(p.id.as_str(), "p1");
        assert_eq!(p.name, "");
        assert_eq!(p.display_name(), UNNAMED);
        assert_eq!(p.price, Decimal::ZERO);
        assert_eq!(p.size, DEFAULT_SIZE);
        assert_eq!(p.category, None);
        assert_eq!(p.category_label(), UNCATEGORIZED);
        assert!(!p.is_in_stock);
        assert!(!p.is_featured);
    }

    #[test]
    fn test_falsy_values_take_defaults() {
        let p = product(json!({
            "id": "p2",
            "name": "",
            "size": "",
            "price": null,
            "rating": "n/a",
            "isFeatured": "yes",
            "quantityInStock": -4
        }));
        assert_eq!(p.display_name(), UNNAMED);
        assert_eq!(p.size, DEFAULT_SIZE);
        assert_eq!(p.price, Decimal::ZERO);
        assert_eq!(p.rating, Decimal::ZERO);
        assert!(!p.is_featured);
        assert_eq!(p.quantity_in_stock, 0);
    }

    #[test]
    fn test_in_stock_defaults_to_quantity() {
        assert!(product(json!({ "id": "a", "quantityInStock": 3 })).is_in_stock);
        assert!(!product(json!({ "id": "a", "quantityInStock": 0 })).is_in_stock);
        let explicit = product(json!({ "id": "a", "quantityInStock": 3, "isInStock": false }));
        assert!(!explicit.is_in_stock);
    }

    #[test]
    fn test_id_falls_back_to_object_id_then_placeholder() {
        assert_eq!(product(json!({ "_id": "mongo-1" })).id.as_str(), "mongo-1");
        assert_eq!(
            product(json!({ "_id": { "$oid": "65f0c0ffee" } })).id.as_str(),
            "65f0c0ffee"
        );
        assert_eq!(product(json!({ "id": 12 })).id.as_str(), "12");

        let listing = Product::from_listing(vec![
            serde_json::from_value(json!({ "id": "x" })).unwrap(),
            serde_json::from_value(json!({ "name": "No id" })).unwrap(),
        ]);
        assert_eq!(listing[1].id.as_str(), "temp-2");
        assert!(listing[0].has_valid_id());
        assert!(!listing[1].has_valid_id());
    }

    #[test]
    fn test_money_parses_exactly() {
        let p = product(json!({ "id": "m", "price": 49.99, "cost": "20.10" }));
        assert_eq!(p.price, Decimal::new(4999, 2));
        assert_eq!(p.cost, Decimal::new(2010, 2));
        assert_eq!(p.selling_price().to_string(), "$49.99");
    }

    #[test]
    fn test_compare_at_price() {
        let p = product(json!({ "id": "d", "price": 40, "discountPercentage": 20 }));
        assert_eq!(p.compare_at_price().map(|c| c.to_string()), Some("$50.00".into()));
        assert_eq!(p.discount_label(), "20");

        let none = product(json!({ "id": "d", "price": 40 }));
        assert!(none.compare_at_price().is_none());

        let full = product(json!({ "id": "d", "price": 40, "discountPercentage": 100 }));
        assert!(full.compare_at_price().is_none());
    }

    #[test]
    fn test_filled_stars() {
        assert_eq!(product(json!({ "id": "r", "rating": 4.7 })).filled_stars(), 4);
        assert_eq!(product(json!({ "id": "r", "rating": 9 })).filled_stars(), 5);
        assert_eq!(product(json!({ "id": "r" })).filled_stars(), 0);
    }

    #[test]
    fn test_category_match_ignores_case() {
        let p = product(json!({ "id": "c", "category": "Pre Workout" }));
        assert!(p.in_category("pre workout"));
        assert!(!p.in_category("protein"));
        assert!(!product(json!({ "id": "c" })).in_category("uncategorized"));
    }

    #[test]
    fn test_serializes_wire_format() {
        let p = product(json!({ "id": "w", "price": 12.5, "category": "BCAA" }));
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["price"], json!(12.5));
        assert_eq!(value["imageUrl"], json!(""));
        assert_eq!(value["isInStock"], json!(false));
        assert_eq!(value["category"], json!("BCAA"));
    }
}
