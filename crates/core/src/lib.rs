//! SuppliMax Core - Shared domain library.
//!
//! This crate provides the domain types and logic used across SuppliMax components:
//! - `storefront` - Public storefront and product administration
//! - `cli` - Command-line tools for catalog and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP clients,
//! no session access. The REST backend owns the records; this crate owns the
//! rules the storefront applies to its copies of them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, and roles
//! - [`product`] - Product records and their normalization from backend JSON
//! - [`catalog`] - Category aggregation over product lists
//! - [`cart`] - Cart line items, cart operations, and order summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod product;
pub mod types;

pub use cart::{Cart, CartItem, MAX_LINE_QUANTITY, OrderSummary, PricingPolicy};
pub use product::{Product, RawProduct};
pub use types::*;
