//! Application state shared across handlers.

use std::sync::Arc;

use supplimax_core::PricingPolicy;

use crate::backend::{BackendClient, BackendError};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the backend client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, backend }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Shipping and tax rules for order summaries.
    #[must_use]
    pub fn pricing(&self) -> &PricingPolicy {
        &self.inner.config.pricing
    }
}
