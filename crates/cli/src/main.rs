//! Mercato CLI - manual driver for the cart engine.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! mercato show
//!
//! # Add two units of a product
//! mercato add --id 42 --name "Oat Milk" --price 3.49 \
//!     --market-id 9 --market-name "Central Market" --qty 2
//!
//! # Remove a product, or set an exact quantity (0 removes)
//! mercato remove --id 42
//! mercato set-qty --id 42 --qty 5
//!
//! # Empty the cart (--local leaves the server cart alone)
//! mercato clear
//! mercato clear --local
//!
//! # Pull the remote cart into the local one
//! mercato sync
//! ```
//!
//! # Environment Variables
//!
//! - `MERCATO_API_BASE_URL` - Base URL of the Mercato REST backend
//! - `MERCATO_API_TOKEN` - Bearer token; without it every command stays local
//! - `MERCATO_STORAGE_DIR` - Cart storage directory (default: .mercato)
//! - `MERCATO_HTTP_TIMEOUT_SECS` - HTTP timeout in seconds (default: 30)
//! - `RUST_LOG` - Log filter (default: info for the mercato crates)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use mercato_core::{ItemInput, MarketId, ProductId};

mod commands;

#[derive(Parser)]
#[command(name = "mercato")]
#[command(author, version, about = "Mercato cart engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product id (numeric or string)
        #[arg(long)]
        id: String,

        /// Product display name
        #[arg(long)]
        name: String,

        /// Unit price, e.g. 3.49
        #[arg(long)]
        price: Decimal,

        /// Product image URL
        #[arg(long)]
        image: Option<String>,

        /// Id of the market the product belongs to
        #[arg(long)]
        market_id: String,

        /// Market display name
        #[arg(long)]
        market_name: String,

        /// Units to add
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        #[arg(long)]
        id: String,
    },
    /// Set the quantity of a cart item (0 removes it)
    SetQty {
        /// Product id
        #[arg(long)]
        id: String,

        /// New quantity
        #[arg(long)]
        qty: i64,
    },
    /// Empty the cart
    Clear {
        /// Leave the remote cart untouched (logout semantics)
        #[arg(long)]
        local: bool,
    },
    /// Replace the local cart with the remote one
    Sync,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mercato_cli=info,mercato_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show => commands::cart::show().await?,
        Commands::Add {
            id,
            name,
            price,
            image,
            market_id,
            market_name,
            qty,
        } => {
            let item = ItemInput {
                id: ProductId::from(id),
                name,
                price,
                image,
                market_id: MarketId::from(market_id),
                market_name,
            };
            commands::cart::add(item, qty).await?;
        }
        Commands::Remove { id } => commands::cart::remove(&id).await?,
        Commands::SetQty { id, qty } => commands::cart::set_qty(&id, qty).await?,
        Commands::Clear { local } => commands::cart::clear(local).await?,
        Commands::Sync => commands::cart::sync().await?,
    }
    Ok(())
}
