//! Navigation chrome shared by every full page.

use tower_sessions::Session;

use supplimax_core::catalog;

use crate::backend::ProductFilter;
use crate::models::{CurrentUser, session_keys};
use crate::services::CartService;
use crate::state::AppState;

/// A static navigation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuLink {
    pub label: &'static str,
    pub href: &'static str,
}

/// A main navigation entry, optionally with a dropdown.
#[derive(Debug, Clone, Copy)]
pub struct NavEntry {
    pub label: &'static str,
    pub href: &'static str,
    pub dropdown: &'static [MenuLink],
}

/// Links above the header.
pub const TOP_LINKS: &[MenuLink] = &[
    MenuLink { label: "About Us", href: "/about" },
    MenuLink { label: "Contact", href: "/contacts" },
    MenuLink { label: "Orders", href: "/orders" },
    MenuLink { label: "FAQ", href: "/faq" },
];

/// Main navigation bar.
pub const MAIN_NAV: &[NavEntry] = &[
    NavEntry { label: "Home", href: "/", dropdown: &[] },
    NavEntry {
        label: "Shop",
        href: "/product",
        dropdown: &[
            MenuLink { label: "Pre Workout", href: "/shop/Pre%20Workout" },
            MenuLink { label: "Protein", href: "/shop/Protein" },
            MenuLink { label: "Fat Burner", href: "/shop/Fat%20Burner" },
            MenuLink { label: "Creatine", href: "/shop/Creatine" },
        ],
    },
    NavEntry { label: "Offers", href: "/offers", dropdown: &[] },
    NavEntry { label: "Blog", href: "/blog", dropdown: &[] },
    NavEntry {
        label: "Pages",
        href: "#",
        dropdown: &[
            MenuLink { label: "Wishlist", href: "/wishlist" },
            MenuLink { label: "Cart", href: "/cart" },
            MenuLink { label: "Checkout", href: "/cart" },
            MenuLink { label: "Account", href: "/account" },
        ],
    },
];

/// Categories offered when the catalog cannot be read or has none.
pub const FALLBACK_CATEGORIES: &[&str] = &[
    "Protein",
    "Pre Workout",
    "Weight Gainer",
    "Creatine",
    "BCAA",
    "Fat Burner",
    "Performance",
];

/// Link into a category page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLink {
    pub name: String,
    pub href: String,
}

impl CategoryLink {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            href: category_href(name),
        }
    }
}

/// URL of the page listing a category.
#[must_use]
pub fn category_href(category: &str) -> String {
    format!("/shop/{}", urlencoding::encode(category))
}

/// Logged-in user as shown in the header.
#[derive(Debug, Clone)]
pub struct UserBadge {
    pub name: String,
    pub email: String,
    pub initials: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserBadge {
    fn from(user: &CurrentUser) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            initials: user.initials(),
            is_admin: user.is_admin(),
        }
    }
}

/// Everything the page chrome needs.
#[derive(Debug, Clone)]
pub struct Layout {
    pub top_links: &'static [MenuLink],
    pub main_nav: &'static [NavEntry],
    pub categories: Vec<CategoryLink>,
    pub user: Option<UserBadge>,
    pub cart_count: u32,
    pub flash: Option<String>,
}

impl Layout {
    /// Build the chrome for the visitor behind `session`.
    ///
    /// Never fails: catalog and cart problems degrade to the static category
    /// list and an empty badge.
    pub async fn build(state: &AppState, session: &Session, user: Option<&CurrentUser>) -> Self {
        let categories = match state.backend().list_products(ProductFilter::All).await {
            Ok(products) => category_links(&catalog::categories(&products)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load categories for navigation");
                Vec::new()
            }
        };
        let categories = if categories.is_empty() {
            FALLBACK_CATEGORIES
                .iter()
                .map(|name| CategoryLink::new(name))
                .collect()
        } else {
            categories
        };

        let cart_count = match CartService::new(state.backend(), session, user).load().await {
            Ok(cart) => cart.item_count(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cart for header");
                0
            }
        };

        let flash = session
            .remove::<String>(session_keys::FLASH)
            .await
            .ok()
            .flatten();

        Self {
            top_links: TOP_LINKS,
            main_nav: MAIN_NAV,
            categories,
            user: user.map(UserBadge::from),
            cart_count,
            flash,
        }
    }
}

fn category_links(names: &[String]) -> Vec<CategoryLink> {
    names.iter().map(|name| CategoryLink::new(name)).collect()
}

/// Queue a message for the next rendered page.
pub async fn set_flash(session: &Session, message: &str) {
    if let Err(e) = session.insert(session_keys::FLASH, message).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_href_encodes_spaces() {
        assert_eq!(category_href("Pre Workout"), "/shop/Pre%20Workout");
        assert_eq!(category_href("BCAA"), "/shop/BCAA");
    }

    #[test]
    fn test_static_menus() {
        let labels: Vec<_> = TOP_LINKS.iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["About Us", "Contact", "Orders", "FAQ"]);

        let nav: Vec<_> = MAIN_NAV.iter().map(|n| n.label).collect();
        assert_eq!(nav, vec!["Home", "Shop", "Offers", "Blog", "Pages"]);

        let shop: Vec<_> = MAIN_NAV[1].dropdown.iter().map(|l| l.label).collect();
        assert_eq!(shop, vec!["Pre Workout", "Protein", "Fat Burner", "Creatine"]);
    }

    #[test]
    fn test_fallback_categories() {
        assert_eq!(FALLBACK_CATEGORIES.len(), 7);
        assert_eq!(FALLBACK_CATEGORIES[0], "Protein");
    }
}
