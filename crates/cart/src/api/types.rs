//! Wire types for the Mercato cart REST API.
//!
//! These mirror the backend's JSON shapes (camelCase fields, numeric or
//! string ids) and are consumed as-is; the engine converts them into local
//! types at the reconciliation boundary.

use rust_decimal::Decimal;
use serde::Deserialize;

use mercato_core::{CartLineId, ItemInput, MarketId, ProductId};

/// One market-scoped cart as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    pub id: String,
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
}

impl RemoteCart {
    /// Find the line holding `product_id`, comparing normalized ids.
    #[must_use]
    pub fn line_for(&self, product_id: &ProductId) -> Option<&RemoteCartItem> {
        self.items
            .iter()
            .find(|line| line.product_id == *product_id)
    }
}

/// One line item within a remote cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartItem {
    /// Server-assigned line id, the handle for updates and removals.
    pub id: CartLineId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub product: RemoteProduct,
}

/// Product snapshot embedded in a cart line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub market_id: MarketId,
    pub market_name: String,
}

impl From<&RemoteCartItem> for ItemInput {
    fn from(line: &RemoteCartItem) -> Self {
        Self {
            id: line.product_id.clone(),
            name: line.product.name.clone(),
            price: line.product.price,
            image: line.product.image.clone(),
            market_id: line.product.market_id.clone(),
            market_name: line.product.market_name.clone(),
        }
    }
}
