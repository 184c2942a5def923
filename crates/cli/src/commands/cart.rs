//! Cart engine commands.
//!
//! Every command builds a fresh engine from environment configuration,
//! rehydrates the persisted cart, runs one operation, and prints the
//! resulting snapshot. With `MERCATO_API_TOKEN` set the commands also sync
//! against the backend; without it everything stays local.

use std::sync::Arc;

use thiserror::Error;

use mercato_cart::api::{ApiError, HttpCartApi};
use mercato_cart::config::{CartConfig, ConfigError};
use mercato_cart::engine::{AddToCartOutcome, CartEngine};
use mercato_cart::session::Session;
use mercato_cart::storage::{FileStorage, MemoryStorage};
use mercato_core::{CartState, ItemInput, ProductId};

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// API client could not be built.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Build an engine from environment configuration.
///
/// Falls back to in-memory storage when the storage directory cannot be
/// created; the cart then lasts for this invocation only.
async fn build_engine() -> Result<CartEngine, CliError> {
    let config = CartConfig::from_env()?;
    let session = Session::new(config.api_token.clone());
    let api = Arc::new(HttpCartApi::new(&config, session.clone())?);

    let engine = match FileStorage::create(&config.storage_dir).await {
        Ok(storage) => CartEngine::start(api, Arc::new(storage), session).await,
        Err(error) => {
            tracing::warn!(
                %error,
                dir = %config.storage_dir.display(),
                "storage directory unavailable, cart will not persist"
            );
            CartEngine::start(api, Arc::new(MemoryStorage::new()), session).await
        }
    };

    Ok(engine)
}

/// Print the current cart.
pub async fn show() -> Result<(), CliError> {
    let engine = build_engine().await?;
    print_cart(&engine.state().await);
    Ok(())
}

/// Add a product to the cart.
pub async fn add(item: ItemInput, quantity: u32) -> Result<(), CliError> {
    let engine = build_engine().await?;

    match engine.add_to_cart(item, quantity).await {
        AddToCartOutcome::Synced(state) => {
            tracing::info!("Added and synced with the remote cart");
            print_cart(&state);
        }
        AddToCartOutcome::LocalOnly(state) => {
            tracing::info!("Added locally (no session, remote sync skipped)");
            print_cart(&state);
        }
        AddToCartOutcome::SyncFailed { state, error } => {
            tracing::warn!("Added locally, remote sync failed: {error}");
            print_cart(&state);
        }
        AddToCartOutcome::Skipped => {
            tracing::warn!("Another add was in flight, nothing changed");
        }
    }

    Ok(())
}

/// Remove a product from the cart.
pub async fn remove(id: &str) -> Result<(), CliError> {
    let engine = build_engine().await?;
    let state = engine.remove_item(&ProductId::from(id)).await;
    print_cart(&state);
    Ok(())
}

/// Set a cart item's quantity.
pub async fn set_qty(id: &str, quantity: i64) -> Result<(), CliError> {
    let engine = build_engine().await?;
    let state = engine.update_quantity(&ProductId::from(id), quantity).await;
    print_cart(&state);
    Ok(())
}

/// Empty the cart. `local` leaves the remote cart untouched.
pub async fn clear(local: bool) -> Result<(), CliError> {
    let engine = build_engine().await?;
    let state = if local {
        engine.clear_local().await
    } else {
        engine.clear().await
    };
    print_cart(&state);
    Ok(())
}

/// Replace the local cart with the remote one.
pub async fn sync() -> Result<(), CliError> {
    let engine = build_engine().await?;
    let state = engine.sync_from_remote().await;
    print_cart(&state);
    Ok(())
}

/// Render a cart snapshot through the logger.
fn print_cart(state: &CartState) {
    if state.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    tracing::info!("Cart:");
    for item in &state.items {
        let sync_marker = if item.cart_line_id.is_some() {
            "synced"
        } else {
            "local"
        };
        tracing::info!(
            "  {} x {} @ {} = {} [{}]",
            item.quantity,
            item.name,
            item.price,
            item.line_total(),
            sync_marker
        );
    }
    tracing::info!("  Total: {} ({} items)", state.total, state.item_count);
}
