//! Cart line items, cart operations, and order summaries.
//!
//! A [`Cart`] is a plain list of lines keyed by product id. It has no notion of
//! where it is stored; the storefront decides whether a cart lives in a guest
//! session or on the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Largest quantity a single cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// One product line in a cart.
///
/// Name, price, image and category are copied from the product when the line
/// is first added and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
}

impl CartItem {
    /// Snapshot a product into a cart line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.display_name().to_string(),
            price: product.price,
            image_url: product.image_url.clone(),
            category: product.category_label().to_string(),
            quantity,
        }
    }

    /// Unit price times quantity, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

/// An ordered collection of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored lines.
    ///
    /// Duplicate product ids are merged into the first line and zero-quantity
    /// lines are dropped, so a cart read back from storage obeys the same rules
    /// as one built through [`Cart::add`].
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items.into_iter().filter(|i| i.quantity > 0) {
            cart.add(item);
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Add a line, or increase the quantity of the existing line for the same
    /// product.
    ///
    /// The added quantity is at least one, and a line never holds more than
    /// [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, item: CartItem) {
        let quantity = item.quantity.clamp(1, MAX_LINE_QUANTITY);
        match self.items.iter_mut().find(|line| line.id == item.id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .saturating_add(quantity)
                    .min(MAX_LINE_QUANTITY);
            }
            None => self.items.push(CartItem { quantity, ..item }),
        }
    }

    /// Remove the line for `id`. Missing lines are ignored.
    pub fn remove(&mut self, id: &ProductId) {
        self.items.retain(|line| &line.id != id);
    }

    /// Set the quantity of the line for `id`.
    ///
    /// A quantity below one removes the line; larger quantities are capped at
    /// [`MAX_LINE_QUANTITY`]. Missing lines are ignored.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove(id);
            return;
        }
        let quantity = u32::try_from(quantity)
            .unwrap_or(MAX_LINE_QUANTITY)
            .min(MAX_LINE_QUANTITY);
        if let Some(line) = self.items.iter_mut().find(|line| &line.id == id) {
            line.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price times quantity over all lines, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, saturating_add)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }
}

/// Shipping and tax rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Decimal,
    /// Shipping charged at or below the threshold.
    pub flat_shipping_fee: Decimal,
    /// Tax as a fraction of the subtotal (0.08 is 8%).
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::new(50, 0),
            flat_shipping_fee: Decimal::new(599, 2),
            tax_rate: Decimal::new(8, 2),
        }
    }
}

impl PricingPolicy {
    /// Compute the order summary for a cart subtotal.
    #[must_use]
    pub fn summarize(&self, subtotal: Decimal) -> OrderSummary {
        let shipping = if subtotal > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping_fee
        };
        let tax = subtotal.checked_mul(self.tax_rate).unwrap_or(Decimal::MAX);
        OrderSummary {
            subtotal,
            shipping,
            tax,
            total: saturating_add(saturating_add(subtotal, shipping), tax),
        }
    }
}

fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::MAX)
}

/// Price breakdown shown next to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// Whether no shipping is charged.
    #[must_use]
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }

    /// Shipping for display: `FREE` or the fee.
    #[must_use]
    pub fn shipping_label(&self) -> String {
        if self.has_free_shipping() {
            "FREE".to_string()
        } else {
            Price::usd(self.shipping).to_string()
        }
    }
}
