//! Cart state transitions.

use crate::cart::state::{CartState, ItemInput};
use crate::types::{CartLineId, ProductId};

/// A transition of the cart state machine.
///
/// `CartAction` is a closed enum, so there is no "unknown action" case to
/// handle at runtime: anything [`reduce`](crate::cart::reduce) receives is
/// one of these five transitions.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Add a product to the cart, merging by product ID.
    ///
    /// If an item with the same ID already exists, its quantity grows by
    /// `initial_quantity` (default 1) and a present `cart_line_id` overwrites
    /// the stored one (last write wins); an absent `cart_line_id` preserves
    /// it. Otherwise a new item is appended.
    AddItem {
        /// Product fields captured at add time.
        item: ItemInput,
        /// Units to add; `None` and `Some(0)` both mean 1.
        initial_quantity: Option<u32>,
        /// Remote line ID, when the add has already been synchronized.
        cart_line_id: Option<CartLineId>,
    },

    /// Remove the item with the given product ID.
    ///
    /// Removing an ID that is not in the cart is a no-op.
    RemoveItem {
        /// Product to remove.
        id: ProductId,
    },

    /// Set an item's quantity to an exact value.
    ///
    /// A value of zero or less removes the item; this is how
    /// "quantity reached zero" is expressed as removal.
    UpdateQuantity {
        /// Product to update.
        id: ProductId,
        /// New quantity; non-positive values remove the item.
        quantity: i64,
    },

    /// Reset the cart to the canonical empty state.
    Clear,

    /// Replace the state wholesale; used only during rehydration.
    ///
    /// The reducer recomputes `total`/`item_count` from the loaded items, so
    /// a stale or corrupted persisted total can never survive a load.
    Load {
        /// The state to load, typically parsed from persisted storage.
        state: CartState,
    },
}
