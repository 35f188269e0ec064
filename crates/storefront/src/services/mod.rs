//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Password accounts stored on the backend
//! - `cart` - Guest and user carts, kept in the session and written through
//!   to the backend for logged-in users

pub mod auth;
pub mod cart;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
