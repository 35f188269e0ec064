//! CLI command implementations.

pub mod products;
pub mod users;

use supplimax_storefront::backend::BackendClient;
use supplimax_storefront::config::BackendConfig;

/// Connect to the backend named by the environment.
fn backend() -> Result<BackendClient, Box<dyn std::error::Error>> {
    let config = BackendConfig::from_env()?;
    tracing::info!(backend = %config.base_url, "Using REST backend");
    Ok(BackendClient::new(&config)?)
}
