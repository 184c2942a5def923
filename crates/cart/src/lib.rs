//! Mercato cart engine.
//!
//! Wraps the pure state machine from `mercato-core` with everything the cart
//! needs to run on a device: persistence to local key-value storage, a REST
//! client for the remote cart API, and the sync coordinator that keeps the
//! two loosely in step.
//!
//! # Architecture
//!
//! - Local state is authoritative. Every operation applies its reducer
//!   transition unconditionally; remote calls are best-effort and never roll
//!   a local change back.
//! - Remote line-item ids are reconciled into local items by product id, so
//!   call ordering never matters for correctness.
//! - Storage failures are logged and absorbed. A device with a broken disk
//!   still has a working (session-only) cart.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use mercato_cart::api::HttpCartApi;
//! use mercato_cart::config::CartConfig;
//! use mercato_cart::engine::CartEngine;
//! use mercato_cart::session::Session;
//! use mercato_cart::storage::FileStorage;
//!
//! let config = CartConfig::from_env()?;
//! let session = Session::default();
//! let api = HttpCartApi::new(&config, session.clone())?;
//! let storage = FileStorage::create(&config.storage_dir).await?;
//!
//! let engine = CartEngine::start(Arc::new(api), Arc::new(storage), session).await;
//! let outcome = engine.add_to_cart(product, 2).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod engine;
pub mod persistence;
pub mod session;
pub mod storage;
