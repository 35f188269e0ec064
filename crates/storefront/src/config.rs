//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//! - `BACKEND_URL` - REST backend root (default: <http://localhost:5000>)
//! - `BACKEND_API_TOKEN` - Bearer token sent to the backend
//! - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Product cache lifetime (default: 60)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 50)
//! - `FLAT_SHIPPING_FEE` - Shipping below the threshold (default: 5.99)
//! - `TAX_RATE` - Tax as a fraction of the subtotal (default: 0.08)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use supplimax_core::PricingPolicy;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Source of configuration values, keyed by variable name.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// REST backend configuration
    pub backend: BackendConfig,
    /// Shipping and tax rules
    pub pricing: PricingPolicy,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// REST backend connection settings.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct BackendConfig {
    /// Root URL of the backend; always ends with `/`
    pub base_url: Url,
    /// Bearer token, when the backend requires one
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product reads stay cached
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// Sentry error tracking settings.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// DSN; Sentry is disabled when absent
    pub dsn: Option<String>,
    /// Environment tag (e.g. "production")
    pub environment: Option<String>,
    /// Fraction of error events sent
    pub sample_rate: f32,
    /// Fraction of transactions sent
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let host = parse_or_default(lookup, "STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_or_default(lookup, "STOREFRONT_PORT", "3000")?;
        let base_url = get_required(lookup, "STOREFRONT_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;
        let static_dir = PathBuf::from(get_or_default(
            lookup,
            "STOREFRONT_STATIC_DIR",
            "crates/storefront/static",
        ));

        Ok(Self {
            host,
            port,
            base_url,
            static_dir,
            backend: BackendConfig::from_lookup(lookup)?,
            pricing: pricing_from_lookup(lookup)?,
            sentry: SentryConfig::from_lookup(lookup)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    /// Load only the backend settings, for tools that talk to the backend
    /// without serving the storefront.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is invalid or the token is insecure.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Settings for a backend at `base_url` with default timeouts and no token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not a URL.
    pub fn for_url(base_url: &str) -> Result<Self, ConfigError> {
        let map = HashMap::from([("BACKEND_URL".to_string(), base_url.to_string())]);
        Self::from_lookup(&|key| map.get(key).cloned())
    }

    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let raw_url = get_or_default(lookup, "BACKEND_URL", "http://localhost:5000");
        let base_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e))?;

        let api_token = match lookup("BACKEND_API_TOKEN").filter(|t| !t.is_empty()) {
            Some(token) => {
                validate_secret_strength(&token, "BACKEND_API_TOKEN")?;
                Some(SecretString::from(token))
            }
            None => None,
        };

        let timeout_secs: u64 = parse_or_default(lookup, "BACKEND_TIMEOUT_SECS", "10")?;
        let cache_ttl_secs: u64 = parse_or_default(lookup, "CATALOG_CACHE_TTL_SECS", "60")?;

        Ok(Self {
            base_url,
            api_token,
            timeout: Duration::from_secs(timeout_secs),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }
}

impl SentryConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
            sample_rate: parse_rate(lookup, "SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_rate(lookup, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

fn pricing_from_lookup(lookup: Lookup<'_>) -> Result<PricingPolicy, ConfigError> {
    let defaults = PricingPolicy::default();
    let policy = PricingPolicy {
        free_shipping_threshold: parse_decimal(
            lookup,
            "FREE_SHIPPING_THRESHOLD",
            defaults.free_shipping_threshold,
        )?,
        flat_shipping_fee: parse_decimal(lookup, "FLAT_SHIPPING_FEE", defaults.flat_shipping_fee)?,
        tax_rate: parse_decimal(lookup, "TAX_RATE", defaults.tax_rate)?,
    };

    if policy.tax_rate >= Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            "TAX_RATE".to_string(),
            "must be a fraction below 1 (0.08 is 8%)".to_string(),
        ));
    }
    Ok(policy)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required(lookup: Lookup<'_>, key: &str) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn get_or_default(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse a variable (or its default) with `FromStr`.
fn parse_or_default<T>(lookup: Lookup<'_>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_or_default(lookup, key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a non-negative decimal amount.
fn parse_decimal(lookup: Lookup<'_>, key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    let Some(raw) = lookup(key).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    let value = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(value)
}

/// Parse a sample rate within `0.0..=1.0`.
fn parse_rate(lookup: Lookup<'_>, key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_or_default(lookup, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

/// Parse the backend root, forcing a trailing slash so `Url::join` appends
/// resource paths instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(())
}
