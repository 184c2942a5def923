//! Cart state and line item types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartLineId, MarketId, ProductId};

/// Product fields captured when an item enters the cart.
///
/// These are display/bookkeeping values copied from the product and its
/// market at add time; they are not re-validated against the backend
/// afterward. Quantity and the remote line ID are tracked separately on
/// [`CartItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInput {
    /// Stable product identifier.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price at the time of adding.
    pub price: Decimal,
    /// Product image URL.
    pub image: Option<String>,
    /// Market the product belongs to.
    pub market_id: MarketId,
    /// Market display name.
    pub market_name: String,
}

/// A line item in the local cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Stable product identifier, unique within the cart.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price at the time of adding.
    pub price: Decimal,
    /// Product image URL.
    pub image: Option<String>,
    /// Market the product belongs to.
    pub market_id: MarketId,
    /// Market display name.
    pub market_name: String,
    /// How many units are in the cart. Always at least 1 while the item
    /// exists; a transition that would leave it at zero removes the item.
    pub quantity: u32,
    /// Line ID in the remote cart service, when this item is synchronized.
    ///
    /// Absent for purely local items (not yet synced, or added while
    /// signed out).
    pub cart_line_id: Option<CartLineId>,
}

impl CartItem {
    /// Price of the full line (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The cart root aggregate.
///
/// `total` and `item_count` are pure functions of `items`; every constructor
/// and every reducer transition recomputes them from the full item list, so
/// no code path can update one without the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    /// Line items in insertion order, unique by product ID.
    pub items: Vec<CartItem>,
    /// Sum over items of `price * quantity`. Derived, never set directly.
    #[serde(default)]
    pub total: Decimal,
    /// Sum over items of `quantity`. Derived, never set directly.
    #[serde(default)]
    pub item_count: u32,
}

impl CartState {
    /// Build a state from a list of items, computing the derived fields.
    ///
    /// This is the only way a non-empty `CartState` is constructed, which
    /// keeps `total`/`item_count` consistent with `items` by construction.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total: Decimal = items.iter().map(CartItem::line_total).sum();
        let item_count = items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity));

        Self {
            items,
            total,
            item_count,
        }
    }

    /// Look up an item by its product ID.
    #[must_use]
    pub fn item(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
