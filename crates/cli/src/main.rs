//! SuppliMax CLI - Catalog and user management against the REST backend.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally narrowed down
//! sm-cli products list
//! sm-cli products list --category "Pre Workout"
//! sm-cli products list --featured
//!
//! # Create products from a YAML file
//! sm-cli products import catalog.yaml
//!
//! # Create an administrator
//! sm-cli users create-admin -e admin@example.com -n "Admin Name" -p 'long passphrase'
//! ```
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Base URL of the REST backend
//! - `BACKEND_API_TOKEN` - Optional bearer token

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "sm-cli")]
#[command(author, version, about = "SuppliMax CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Only products in this category (case-insensitive)
        #[arg(short, long)]
        category: Option<String>,

        /// Only featured products
        #[arg(short, long)]
        featured: bool,
    },
    /// Create products from a YAML file
    Import {
        /// Path to a YAML list of products
        file: String,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Create an administrator account
    CreateAdmin {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { category, featured } => {
                commands::products::list(category.as_deref(), featured).await?;
            }
            ProductsAction::Import { file } => {
                commands::products::import(&file).await?;
            }
        },
        Commands::Users { action } => match action {
            UsersAction::CreateAdmin {
                email,
                name,
                password,
            } => {
                commands::users::create_admin(&email, &name, &SecretString::from(password)).await?;
            }
        },
    }
    Ok(())
}
