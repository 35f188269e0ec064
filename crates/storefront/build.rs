//! Build script for storefront crate.
//!
//! Computes a content hash of the stylesheet so templates can append it as a
//! cache-busting query string.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let hash = fs::read(&css_path).map_or_else(
        |e| {
            println!("cargo:warning=Could not read main.css: {e}");
            String::new()
        },
        |content| {
            let digest = format!("{:x}", Sha256::digest(&content));
            digest.chars().take(8).collect()
        },
    );

    // Exposed to the crate as env!("CSS_HASH")
    println!("cargo:rustc-env=CSS_HASH={hash}");
}
