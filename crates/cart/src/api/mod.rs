//! Remote cart API port and REST client.
//!
//! The Mercato backend keeps one cart per market, each holding line items
//! with server-assigned ids. This module defines the port the engine talks
//! through ([`CartApi`]), the wire types it consumes, and the production
//! [`HttpCartApi`] client.
//!
//! Remote calls are best-effort from the engine's point of view: every error
//! defined here is either logged or surfaced inside an outcome, never
//! allowed to veto a local cart change.

mod http;
pub mod types;

pub use http::HttpCartApi;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use mercato_core::{CartLineId, ProductId};

/// Errors that can occur when interacting with the remote cart API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Add succeeded but the response carried no line for the product.
    #[error("No cart line found for product: {0}")]
    MissingLine(ProductId),
}

/// Remote cart API port.
///
/// Quantities cross the wire as `i64`, matching the backend contract; the
/// engine owns clamping them into the local `u32` range.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Add `quantity` units of a product to the caller's remote cart.
    /// Returns the cart the backend placed the line in.
    async fn add_item(&self, product_id: &ProductId, quantity: i64)
    -> Result<RemoteCart, ApiError>;

    /// Set the quantity of an existing line. Returns the updated cart.
    async fn update_item(
        &self,
        cart_line_id: &CartLineId,
        quantity: i64,
    ) -> Result<RemoteCart, ApiError>;

    /// Delete a line from its cart.
    async fn remove_item(&self, cart_line_id: &CartLineId) -> Result<(), ApiError>;

    /// Fetch every market-scoped cart belonging to the caller.
    async fn get_carts(&self) -> Result<Vec<RemoteCart>, ApiError>;

    /// Delete every cart belonging to the caller.
    async fn clear_carts(&self) -> Result<(), ApiError>;
}
