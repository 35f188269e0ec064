//! Integration test harness for the SuppliMax storefront.
//!
//! Each [`TestContext`] starts a [`MockBackend`] and the storefront
//! application on ephemeral local ports, then drives the storefront over
//! HTTP with a cookie-keeping client, the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p supplimax-integration-tests
//! ```
//!
//! Nothing external is needed; the backend is served in-process.

#![allow(clippy::missing_panics_doc)]

pub mod mock_backend;

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use reqwest::{Client, Response, redirect};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use supplimax_core::PricingPolicy;
use supplimax_storefront::backend::BackendClient;
use supplimax_storefront::config::{BackendConfig, SentryConfig, StorefrontConfig};
use supplimax_storefront::services::AuthService;
use supplimax_storefront::state::AppState;

pub use mock_backend::MockBackend;

/// Password used for every test account.
pub const PASSWORD: &str = "correct-horse-battery";

/// A small catalog covering the shapes the storefront must handle.
#[must_use]
pub fn sample_products() -> Vec<Value> {
    vec![
        json!({
            "id": "p1",
            "name": "Gold Standard Whey",
            "price": 59.99,
            "cost": 30,
            "description": "24g of protein per scoop",
            "imageUrl": "https://img.example.com/whey.jpg",
            "quantityInStock": 25,
            "size": "2 lb",
            "rating": 4.7,
            "color": "Vanilla",
            "category": "Protein",
            "isFeatured": true,
            "sku": "WHEY-2LB"
        }),
        json!({
            "id": "p2",
            "name": "Pump Pre",
            "price": 40,
            "discountPercentage": 20,
            "onSale": true,
            "isNewArrival": true,
            "quantityInStock": 10,
            "category": "Pre Workout",
            "isFeatured": true
        }),
        json!({
            "id": "p3",
            "name": "Creatine Monohydrate",
            "price": "12.50",
            "quantityInStock": 100,
            "category": "Creatine",
            "isExclusive": true
        }),
        json!({
            "name": "Mystery Blend",
            "price": 15,
            "category": "Protein",
            "isFeatured": true
        }),
    ]
}

/// A running storefront wired to a mock backend.
pub struct TestContext {
    pub backend: MockBackend,
    pub base_url: String,
    pub client: Client,
}

impl TestContext {
    /// Storefront over the sample catalog.
    pub async fn new() -> Self {
        Self::with_products(sample_products()).await
    }

    /// Storefront over the given product records.
    pub async fn with_products(products: Vec<Value>) -> Self {
        let backend = MockBackend::start().await;
        backend.seed("products", products);

        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static"),
            backend: backend_config(&backend),
            pricing: PricingPolicy::default(),
            sentry: SentryConfig::default(),
        };
        let state = AppState::new(config).expect("Failed to build app state");
        let app = supplimax_storefront::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            backend,
            base_url: format!("http://{addr}"),
            client: browser(),
        }
    }

    /// Absolute URL of a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET with the context's client.
    pub async fn get(&self, path: &str) -> Response {
        get(&self.client, &self.url(path)).await
    }

    /// GET a page and return its body, asserting a 200.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), 200, "GET {path}");
        response.text().await.expect("Failed to read body")
    }

    /// POST a form with the context's client.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        post_form(&self.client, &self.url(path), form).await
    }

    /// POST a form as an HTMX request.
    pub async fn post_htmx(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("Request failed")
    }

    /// Register a customer account; the client ends up logged in.
    pub async fn register(&self, name: &str, email: &str) -> Response {
        self.post_form(
            "/auth/register",
            &[
                ("name", name),
                ("email", email),
                ("password", PASSWORD),
                ("password_confirm", PASSWORD),
            ],
        )
        .await
    }

    /// Log the context's client in.
    pub async fn login(&self, email: &str) -> Response {
        self.post_form("/auth/login", &[("email", email), ("password", PASSWORD)])
            .await
    }

    /// Log the context's client out.
    pub async fn logout(&self) -> Response {
        self.post_form("/auth/logout", &[]).await
    }

    /// Create an administrator directly through the backend.
    pub async fn create_admin(&self, email: &str) {
        let client =
            BackendClient::new(&backend_config(&self.backend)).expect("Failed to build client");
        AuthService::new(&client)
            .register_admin("Store Admin", email, PASSWORD)
            .await
            .expect("Failed to create admin");
    }

    /// A second, independent browser for the same storefront.
    #[must_use]
    pub fn new_browser(&self) -> Client {
        browser()
    }
}

fn backend_config(backend: &MockBackend) -> BackendConfig {
    BackendConfig::for_url(backend.url()).expect("Mock backend URL is valid")
}

/// A client that keeps cookies and does not follow redirects.
#[must_use]
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// GET `url` with `client`.
pub async fn get(client: &Client, url: &str) -> Response {
    client.get(url).send().await.expect("Request failed")
}

/// POST a form to `url` with `client`.
pub async fn post_form(client: &Client, url: &str, form: &[(&str, &str)]) -> Response {
    client
        .post(url)
        .form(form)
        .send()
        .await
        .expect("Request failed")
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
}
