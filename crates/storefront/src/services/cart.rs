//! Cart reconciliation between the session and the backend.
//!
//! A visitor who is not logged in keeps their cart in the session only
//! (`guest_cart`). A logged-in user works on a session copy (`user_cart`)
//! that is written through to the backend's `/carts` collection after every
//! change. The session copy is always committed first; a failed remote save
//! is logged and never rolls it back.

use tower_sessions::Session;
use tracing::instrument;

use supplimax_core::{Cart, CartItem, ProductId};

use crate::backend::{BackendClient, NewCart};
use crate::models::{CurrentUser, session_keys};

/// Errors from cart operations.
///
/// Remote persistence failures are not errors; only the session can fail.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Cart operations for the visitor behind one request.
pub struct CartService<'a> {
    backend: &'a BackendClient,
    session: &'a Session,
    user: Option<&'a CurrentUser>,
}

impl<'a> CartService<'a> {
    /// Create a cart service for a guest (`user` is `None`) or a logged-in user.
    #[must_use]
    pub const fn new(
        backend: &'a BackendClient,
        session: &'a Session,
        user: Option<&'a CurrentUser>,
    ) -> Self {
        Self {
            backend,
            session,
            user,
        }
    }

    const fn session_key(&self) -> &'static str {
        if self.user.is_some() {
            session_keys::USER_CART
        } else {
            session_keys::GUEST_CART
        }
    }

    /// The active cart.
    ///
    /// For a logged-in user without a session copy, the backend cart is
    /// loaded and becomes the session copy. If that load fails the cart reads
    /// as empty and nothing is stored, so the next read tries again. A change
    /// made in the meantime starts from the empty cart, becomes the session
    /// copy, and replaces the stored backend cart once a save succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    pub async fn load(&self) -> Result<Cart, CartError> {
        if let Some(cart) = self.session.get::<Cart>(self.session_key()).await? {
            return Ok(cart);
        }

        let Some(user) = self.user else {
            return Ok(Cart::new());
        };

        match self.backend.find_cart(&user.id).await {
            Ok(record) => {
                let cart = record.map_or_else(Cart::new, |r| Cart::from_items(r.items));
                self.session.insert(session_keys::USER_CART, &cart).await?;
                Ok(cart)
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load cart from backend");
                Ok(Cart::new())
            }
        }
    }

    /// Add a line, or increase the quantity of the existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add(&self, item: CartItem) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        cart.add(item);
        self.commit(cart).await
    }

    /// Remove the line for a product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        cart.remove(id);
        self.commit(cart).await
    }

    /// Set the quantity of a line; below one removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_quantity(&self, id: &ProductId, quantity: i64) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        cart.update_quantity(id, quantity);
        self.commit(cart).await
    }

    /// Empty the cart. The guest cart is dropped as well, even for a logged-in
    /// user.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, CartError> {
        self.session.remove::<Cart>(session_keys::GUEST_CART).await?;
        self.commit(Cart::new()).await
    }

    async fn commit(&self, cart: Cart) -> Result<Cart, CartError> {
        self.session.insert(self.session_key(), &cart).await?;
        if let Some(user) = self.user {
            save_remote(self.backend, user, &cart).await;
        }
        Ok(cart)
    }
}

/// Write a user's cart to the backend, replacing their existing record or
/// creating one. Failures are logged.
async fn save_remote(backend: &BackendClient, user: &CurrentUser, cart: &Cart) {
    let items = cart.items().to_vec();
    let result = match backend.find_cart(&user.id).await {
        Ok(Some(record)) => backend
            .replace_cart(&record.with_items(items))
            .await
            .map(|_| ()),
        Ok(None) => backend
            .create_cart(&NewCart::new(user.id.clone(), items))
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to save cart to backend");
    }
}

/// Switch the session to a user who just logged in.
///
/// The user's backend cart becomes the working cart. Without one, the guest
/// cart carries over and is saved for the user. If the backend cannot be
/// read, the guest cart carries over unsaved.
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails.
#[instrument(skip(backend, session, user), fields(user_id = %user.id))]
pub async fn adopt_on_login(
    backend: &BackendClient,
    session: &Session,
    user: &CurrentUser,
) -> Result<Cart, CartError> {
    let guest = session
        .get::<Cart>(session_keys::GUEST_CART)
        .await?
        .unwrap_or_default();

    let cart = match backend.find_cart(&user.id).await {
        Ok(Some(record)) => Cart::from_items(record.items),
        Ok(None) => {
            if !guest.is_empty() {
                save_remote(backend, user, &guest).await;
            }
            guest
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load cart at login, keeping guest cart");
            guest
        }
    };

    session.insert(session_keys::USER_CART, &cart).await?;
    Ok(cart)
}

/// Drop the logged-in user's session state. The guest cart, if any, becomes
/// active again.
///
/// # Errors
///
/// Returns `CartError::Session` if the session store fails.
pub async fn forget_user(session: &Session) -> Result<(), CartError> {
    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    session.remove::<Cart>(session_keys::USER_CART).await?;
    Ok(())
}
