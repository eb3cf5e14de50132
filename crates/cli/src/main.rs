//! Shopify Embedded CLI - Database migrations and session management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! se-cli migrate
//!
//! # List stored sessions, optionally for one shop
//! se-cli sessions list
//! se-cli sessions list --shop my-store.myshopify.com
//!
//! # Forget a shop (forces a new token exchange on its next load)
//! se-cli sessions delete --shop my-store.myshopify.com
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "se-cli")]
#[command(author, version, about = "Shopify embedded app CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect and remove stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// List stored sessions
    List {
        /// Only list sessions for this shop
        #[arg(short, long)]
        shop: Option<String>,
    },
    /// Delete every session of a shop
    Delete {
        /// Shop domain (e.g., my-store.myshopify.com)
        #[arg(short, long)]
        shop: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Sessions { action } => match action {
            SessionsAction::List { shop } => commands::sessions::list(shop.as_deref()).await?,
            SessionsAction::Delete { shop } => commands::sessions::delete(&shop).await?,
        },
    }
    Ok(())
}
