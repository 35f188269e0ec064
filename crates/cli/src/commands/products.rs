//! Catalog commands.
//!
//! # Import file format
//!
//! A YAML list of products using the backend's field names:
//!
//! ```yaml
//! - name: Gold Standard Whey
//!   price: 59.99
//!   category: Protein
//!   quantityInStock: 25
//!   isFeatured: true
//! ```
//!
//! Missing fields take the same defaults the storefront applies when reading
//! products. Ids in the file are ignored; the backend assigns new ones.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use supplimax_core::{Product, RawProduct, catalog};
use supplimax_storefront::backend::ProductFilter;

/// Errors reading an import file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid product file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Product #{0} has no name")]
    MissingName(usize),

    #[error("The file contains no products")]
    Empty,
}

/// Parse an import file's contents into products ready to create.
///
/// # Errors
///
/// Returns an error if the YAML is not a list of product maps, the list is
/// empty, or a product has no name.
pub fn parse_catalog(contents: &str) -> Result<Vec<Product>, ImportError> {
    let records: Vec<RawProduct> = serde_yaml::from_str(contents)?;
    if records.is_empty() {
        return Err(ImportError::Empty);
    }

    let products = Product::from_listing(records);
    if let Some(position) = products.iter().position(|p| p.name.is_empty()) {
        return Err(ImportError::MissingName(position + 1));
    }
    Ok(products)
}

/// One line of `products list` output.
#[must_use]
pub fn format_row(product: &Product) -> String {
    format!(
        "{:<24} {:<32} {:>10} {:>6}  {}",
        product.id,
        product.display_name(),
        product.selling_price().to_string(),
        product.quantity_in_stock,
        product.category_label(),
    )
}

/// List products, optionally only one category or only featured ones.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or answers badly.
#[allow(clippy::print_stdout)]
pub async fn list(category: Option<&str>, featured: bool) -> Result<(), Box<dyn std::error::Error>> {
    let backend = super::backend()?;

    let filter = if featured {
        ProductFilter::Featured
    } else {
        ProductFilter::All
    };
    let products = backend.list_products(filter).await?.to_vec();
    let products = match category {
        Some(category) => catalog::filter_by_category(products, category),
        None => products,
    };

    println!(
        "{:<24} {:<32} {:>10} {:>6}  CATEGORY",
        "ID", "NAME", "PRICE", "STOCK"
    );
    for product in &products {
        println!("{}", format_row(product));
    }
    info!(count = products.len(), "Listed products");

    Ok(())
}

/// Create every product in a YAML file.
///
/// Products are created one at a time; a failure stops the import and
/// reports how many were created before it.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or a create fails.
pub async fn import(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    let contents = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: file_path.to_owned(),
        source,
    })?;
    let products = parse_catalog(&contents)?;

    info!(path = %file_path, count = products.len(), "Importing products");

    let backend = super::backend()?;
    let total = products.len();
    for (created, product) in products.iter().enumerate() {
        match backend.create_product(product).await {
            Ok(stored) => info!(id = %stored.id, name = %stored.name, "Created product"),
            Err(e) => {
                warn!(created, total, "Import stopped");
                return Err(e.into());
            }
        }
    }

    info!(count = total, "Import complete");
    Ok(())
}
