//! The pure cart reducer.

use std::collections::HashSet;

use crate::cart::action::CartAction;
use crate::cart::state::{CartItem, CartState, ItemInput};
use crate::types::{CartLineId, ProductId};

/// Apply a transition to the cart state.
///
/// Pure and deterministic: no I/O, no side effects. Every transition that
/// changes the item list rebuilds the state through
/// [`CartState::from_items`], so `total` and `item_count` are recomputed in
/// the same step - including for [`CartAction::Load`], which makes the
/// reducer the single source of truth for the derived fields even when
/// rehydrating from storage.
#[must_use]
pub fn reduce(state: CartState, action: CartAction) -> CartState {
    match action {
        CartAction::AddItem {
            item,
            initial_quantity,
            cart_line_id,
        } => add_item(state, item, initial_quantity, cart_line_id),
        CartAction::RemoveItem { id } => remove_item(state, &id),
        CartAction::UpdateQuantity { id, quantity } => update_quantity(state, &id, quantity),
        CartAction::Clear => CartState::default(),
        CartAction::Load { state: loaded } => load(loaded),
    }
}

fn load(loaded: CartState) -> CartState {
    // Loaded states come from storage blobs or remote reconciliation, not
    // from a prior transition, so the structural invariants are re-checked
    // here: the quantity floor and one item per product id (first
    // occurrence wins). A dropped entry does not claim its id's slot.
    let mut seen: HashSet<ProductId> = HashSet::new();
    let items = loaded
        .items
        .into_iter()
        .filter(|item| item.quantity > 0 && seen.insert(item.id.clone()))
        .collect();
    CartState::from_items(items)
}

fn add_item(
    state: CartState,
    item: ItemInput,
    initial_quantity: Option<u32>,
    cart_line_id: Option<CartLineId>,
) -> CartState {
    // An add of zero units would plant an item that violates the
    // quantity >= 1 invariant; removal is expressed through RemoveItem or
    // UpdateQuantity, never through an add.
    let quantity = initial_quantity.unwrap_or(1).max(1);

    let mut items = state.items;
    if let Some(existing) = items.iter_mut().find(|existing| existing.id == item.id) {
        existing.quantity = existing.quantity.saturating_add(quantity);
        // Last write wins, but an absent payload preserves the stored ID.
        if cart_line_id.is_some() {
            existing.cart_line_id = cart_line_id;
        }
    } else {
        items.push(CartItem {
            id: item.id,
            name: item.name,
            price: item.price,
            image: item.image,
            market_id: item.market_id,
            market_name: item.market_name,
            quantity,
            cart_line_id,
        });
    }

    CartState::from_items(items)
}

fn remove_item(state: CartState, id: &ProductId) -> CartState {
    let mut items = state.items;
    items.retain(|item| item.id != *id);
    CartState::from_items(items)
}

fn update_quantity(state: CartState, id: &ProductId, quantity: i64) -> CartState {
    let new_quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);

    let mut items = state.items;
    for item in &mut items {
        if item.id == *id {
            item.quantity = new_quantity;
        }
    }
    items.retain(|item| item.quantity > 0);

    CartState::from_items(items)
}
