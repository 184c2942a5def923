//! The cart state machine.
//!
//! A cart is a list of line items plus two derived fields (`total` and
//! `item_count`). All mutation goes through [`reduce`], a pure function from
//! a state and an action to the next state. There is no I/O here: loading,
//! saving, and remote synchronization live in the `mercato-cart` crate and
//! drive this module from the outside.

pub mod action;
pub mod reducer;
pub mod state;

pub use action::CartAction;
pub use reducer::reduce;
pub use state::{CartItem, CartState, ItemInput};
