//! Shared fixtures for the Mercato cart engine integration tests.
//!
//! # Test Setup
//!
//! Engine scenarios run against [`MemoryStorage`] and [`ScriptedCartApi`],
//! a hand-rolled double for the remote cart API. The double records every
//! call in order, can be told to fail individual operations, and otherwise
//! behaves like the backend: adds are merged into a server-side cart and
//! echoed back with generated line ids.
//!
//! File-storage round trips use `tempfile` directories instead.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;
use tokio::sync::Mutex;

use mercato_cart::api::{ApiError, CartApi, RemoteCart, RemoteCartItem, RemoteProduct};
use mercato_cart::engine::CartEngine;
use mercato_cart::session::Session;
use mercato_cart::storage::MemoryStorage;
use mercato_core::{CartLineId, ItemInput, MarketId, ProductId};

// =============================================================================
// Scripted remote API double
// =============================================================================

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    AddItem {
        product_id: ProductId,
        quantity: i64,
    },
    UpdateItem {
        cart_line_id: CartLineId,
        quantity: i64,
    },
    RemoveItem {
        cart_line_id: CartLineId,
    },
    GetCarts,
    ClearCarts,
}

/// Scripted double for the remote cart API.
///
/// Every call is recorded before the failure flags are consulted, so tests
/// can assert both "was called and failed" and "was never called".
#[derive(Default)]
pub struct ScriptedCartApi {
    carts: Mutex<Vec<RemoteCart>>,
    calls: Mutex<Vec<ApiCall>>,
    next_line: AtomicU64,
    /// Fail `add_item` with a scripted 500.
    pub fail_add: AtomicBool,
    /// Fail `update_item` with a scripted 500.
    pub fail_update: AtomicBool,
    /// Fail `remove_item` with a scripted 500.
    pub fail_remove: AtomicBool,
    /// Fail `get_carts` with a scripted 500.
    pub fail_get: AtomicBool,
    /// Fail `clear_carts` with a scripted 500.
    pub fail_clear: AtomicBool,
    /// Let `add_item` succeed but answer with a cart missing the new line.
    pub omit_line_on_add: AtomicBool,
}

impl ScriptedCartApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a remote cart for `get_carts` to return.
    pub async fn seed_cart(&self, cart: RemoteCart) {
        self.carts.lock().await.push(cart);
    }

    /// Calls recorded so far, in order.
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub async fn count_calls(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| predicate(c)).count()
    }

    fn scripted_failure(op: &str) -> ApiError {
        ApiError::Api {
            status: 500,
            message: format!("scripted {op} failure"),
        }
    }
}

#[async_trait]
impl CartApi for ScriptedCartApi {
    async fn add_item(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<RemoteCart, ApiError> {
        self.calls.lock().await.push(ApiCall::AddItem {
            product_id: product_id.clone(),
            quantity,
        });

        if self.fail_add.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure("add"));
        }

        if self.omit_line_on_add.load(Ordering::SeqCst) {
            return Ok(RemoteCart {
                id: "cart-1".to_string(),
                items: vec![],
            });
        }

        let mut carts = self.carts.lock().await;
        if carts.is_empty() {
            carts.push(RemoteCart {
                id: "cart-1".to_string(),
                items: vec![],
            });
        }

        // The backend merges repeated adds into the existing line.
        if let Some(cart) = carts.first_mut() {
            if let Some(line) = cart
                .items
                .iter_mut()
                .find(|line| line.product_id == *product_id)
            {
                line.quantity += quantity;
            } else {
                let line_number = self.next_line.fetch_add(1, Ordering::SeqCst) + 1;
                cart.items
                    .push(remote_line(&format!("line-{line_number}"), product_id.as_str(), quantity));
            }
            return Ok(cart.clone());
        }

        Err(Self::scripted_failure("add"))
    }

    async fn update_item(
        &self,
        cart_line_id: &CartLineId,
        quantity: i64,
    ) -> Result<RemoteCart, ApiError> {
        self.calls.lock().await.push(ApiCall::UpdateItem {
            cart_line_id: cart_line_id.clone(),
            quantity,
        });

        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure("update"));
        }

        let mut carts = self.carts.lock().await;
        for cart in carts.iter_mut() {
            if let Some(line) = cart.items.iter_mut().find(|line| line.id == *cart_line_id) {
                line.quantity = quantity;
                return Ok(cart.clone());
            }
        }

        Err(ApiError::Api {
            status: 404,
            message: format!("no line {}", cart_line_id.as_str()),
        })
    }

    async fn remove_item(&self, cart_line_id: &CartLineId) -> Result<(), ApiError> {
        self.calls.lock().await.push(ApiCall::RemoveItem {
            cart_line_id: cart_line_id.clone(),
        });

        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure("remove"));
        }

        let mut carts = self.carts.lock().await;
        for cart in carts.iter_mut() {
            cart.items.retain(|line| line.id != *cart_line_id);
        }

        Ok(())
    }

    async fn get_carts(&self) -> Result<Vec<RemoteCart>, ApiError> {
        self.calls.lock().await.push(ApiCall::GetCarts);

        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure("get"));
        }

        Ok(self.carts.lock().await.clone())
    }

    async fn clear_carts(&self) -> Result<(), ApiError> {
        self.calls.lock().await.push(ApiCall::ClearCarts);

        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure("clear"));
        }

        self.carts.lock().await.clear();
        Ok(())
    }
}

// =============================================================================
// Fixture helpers
// =============================================================================

/// Item input priced at 2.50 in market `m1`.
#[must_use]
pub fn sample_item(id: &str) -> ItemInput {
    ItemInput {
        id: ProductId::from(id),
        name: format!("Product {id}"),
        price: Decimal::new(250, 2),
        image: None,
        market_id: MarketId::from("m1"),
        market_name: "Central Market".to_string(),
    }
}

/// Remote line for `product_id`, priced like [`sample_item`].
#[must_use]
pub fn remote_line(line_id: &str, product_id: &str, quantity: i64) -> RemoteCartItem {
    RemoteCartItem {
        id: CartLineId::from(line_id),
        product_id: ProductId::from(product_id),
        quantity,
        product: RemoteProduct {
            id: ProductId::from(product_id),
            name: format!("Product {product_id}"),
            price: Decimal::new(250, 2),
            image: None,
            market_id: MarketId::from("m1"),
            market_name: "Central Market".to_string(),
        },
    }
}

/// Remote cart holding `items`.
#[must_use]
pub fn remote_cart(id: &str, items: Vec<RemoteCartItem>) -> RemoteCart {
    RemoteCart {
        id: id.to_string(),
        items,
    }
}

/// Session holding a test bearer token.
#[must_use]
pub fn authenticated_session() -> Session {
    Session::new(Some(SecretString::from("test-token")))
}

/// Engine over fresh memory storage with an authenticated session.
pub async fn engine_with(api: Arc<ScriptedCartApi>) -> CartEngine {
    CartEngine::start(api, Arc::new(MemoryStorage::new()), authenticated_session()).await
}

/// Engine over fresh memory storage with no session.
pub async fn local_engine(api: Arc<ScriptedCartApi>) -> CartEngine {
    CartEngine::start(api, Arc::new(MemoryStorage::new()), Session::default()).await
}
