//! REST backend client.
//!
//! # Architecture
//!
//! - The backend owns every record; the storefront keeps no database
//! - Collections: `/products`, `/carts`, `/users`
//! - Filtering uses equality query parameters (`?userId=...`, `?isFeatured=true`)
//! - Product reads are cached in memory via `moka`; any product write clears the cache
//! - Carts and users are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use supplimax_storefront::backend::{BackendClient, ProductFilter};
//!
//! let client = BackendClient::new(&config.backend)?;
//! let featured = client.list_products(ProductFilter::Featured).await?;
//! let cart = client.find_cart(&user_id).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use supplimax_core::{Product, ProductId, RawProduct, UserId};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};
pub use types::{CartRecord, NewCart, NewUser, UserRecord};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but had the wrong shape.
    #[error("Invalid data format received from server: {0}")]
    InvalidFormat(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Which products a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFilter {
    All,
    Featured,
}

/// Client for the REST backend.
///
/// Cheap to clone; all clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("supplimax-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// Root URL of the backend.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a collection or record URL with optional equality filters.
    fn endpoint(&self, path: &str, filters: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.join(path)?;
        if !filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in filters {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// URL of a single record, with the id percent-encoded as one path segment.
    fn record(&self, collection: &str, id: &str) -> Result<Url, BackendError> {
        self.endpoint(&format!("{collection}/{}", urlencoding::encode(id)), &[])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.api_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<String, BackendError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn write_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, BackendError> {
        self.send_json(self.request(method, url).json(body)).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products, normalized and in backend order.
    ///
    /// Records without an id get placeholder ids by position.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the backend does not answer with a JSON
    /// array, or an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Arc<Vec<Product>>, BackendError> {
        let featured_only = filter == ProductFilter::Featured;
        let cache_key = CacheKey::Products { featured_only };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let filters: &[(&str, &str)] = if featured_only {
            &[("isFeatured", "true")]
        } else {
            &[]
        };
        let body: Value = self.get_json(self.endpoint("products", filters)?).await?;
        let Value::Array(records) = body else {
            return Err(BackendError::InvalidFormat(
                "expected an array of products".to_string(),
            ));
        };

        let raw = records
            .into_iter()
            .map(|record| serde_json::from_value::<RawProduct>(record).unwrap_or_default())
            .collect();
        let products = Arc::new(Product::from_listing(raw));

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get one product, from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the backend has no such product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.get_product_fresh(id).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get one product straight from the backend, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the backend has no such product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_fresh(&self, id: &ProductId) -> Result<Product, BackendError> {
        let result: Result<Value, _> = self.get_json(self.record("products", id.as_str())?).await;
        match result {
            Ok(record @ Value::Object(_)) => Ok(normalize_record(record)),
            Ok(_) => Err(BackendError::InvalidFormat(
                "expected a product object".to_string(),
            )),
            Err(BackendError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(BackendError::NotFound(format!("Product not found: {id}")))
            }
            Err(e) => Err(e),
        }
    }

    /// Create a product. The backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &Product) -> Result<Product, BackendError> {
        let body = product_body(product)?;
        let created: Value = self
            .write_json(Method::POST, self.endpoint("products", &[])?, &body)
            .await?;
        self.inner.cache.invalidate_all();
        Ok(normalize_record(created))
    }

    /// Update a product's editable fields.
    ///
    /// Uses `PATCH` so fields the form does not manage stay untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product no longer exists.
    #[instrument(skip(self, product), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        product: &Product,
    ) -> Result<Product, BackendError> {
        let body = product_body(product)?;
        let result: Result<Value, _> = self
            .write_json(Method::PATCH, self.record("products", id.as_str())?, &body)
            .await;
        self.inner.cache.invalidate_all();
        match result {
            Ok(updated) => Ok(normalize_record(updated)),
            Err(BackendError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(BackendError::NotFound(format!("Product not found: {id}")))
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Cart Methods (not cached)
    // =========================================================================

    /// Find the stored cart of a user. The first match wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the answer is not an array.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn find_cart(&self, user_id: &UserId) -> Result<Option<CartRecord>, BackendError> {
        let carts: Vec<CartRecord> = self
            .get_json(self.endpoint("carts", &[("userId", user_id.as_str())])?)
            .await?;
        Ok(carts.into_iter().next())
    }

    /// Create a cart record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, cart), fields(user_id = %cart.user_id))]
    pub async fn create_cart(&self, cart: &NewCart) -> Result<CartRecord, BackendError> {
        self.write_json(Method::POST, self.endpoint("carts", &[])?, cart)
            .await
    }

    /// Replace a cart record in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, cart), fields(cart_id = %cart.id))]
    pub async fn replace_cart(&self, cart: &CartRecord) -> Result<CartRecord, BackendError> {
        self.write_json(Method::PUT, self.record("carts", cart.id.as_str())?, cart)
            .await
    }

    // =========================================================================
    // User Methods (not cached)
    // =========================================================================

    /// Find a user by exact email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, email))]
    pub async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, BackendError> {
        let users: Vec<UserRecord> = self
            .get_json(self.endpoint("users", &[("email", email)])?)
            .await?;
        Ok(users.into_iter().next())
    }

    /// Create a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, user))]
    pub async fn create_user(&self, user: &NewUser) -> Result<UserRecord, BackendError> {
        self.write_json(Method::POST, self.endpoint("users", &[])?, user)
            .await
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check that the backend answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the products collection cannot be read.
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.send(self.request(Method::GET, self.endpoint("products", &[("_limit", "1")])?))
            .await
            .map(|_| ())
    }
}

/// Normalize a single product record; its listing position is irrelevant.
fn normalize_record(record: Value) -> Product {
    Product::from_raw(serde_json::from_value(record).unwrap_or_default(), 0)
}

/// Serialize a product for a write, without its id.
fn product_body(product: &Product) -> Result<Value, BackendError> {
    let mut body = serde_json::to_value(product)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}
