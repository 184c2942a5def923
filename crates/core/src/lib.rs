//! Mercato Core - Shared types and the cart state machine.
//!
//! This crate provides the types used across all Mercato components:
//! - `cart` - The cart engine crate (persistence, remote sync)
//! - `cli` - Command-line driver for poking at a backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows the cart state
//! machine to be tested in complete isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe string identifiers
//! - [`cart`] - Cart state, actions, and the pure reducer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::*;
pub use types::*;
