//! Cart sync coordinator.
//!
//! Ties the pure reducer to persistence and the remote cart API. Local
//! state is authoritative: every operation applies its transition whether
//! or not the matching remote call works out, and remote failures degrade
//! to a log line or an outcome variant. Remote line ids are reconciled into
//! local items by product id, so the order in which calls complete never
//! affects correctness.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use mercato_core::{CartAction, CartState, ItemInput, ProductId, reduce};

use crate::api::{ApiError, CartApi, RemoteCart};
use crate::persistence::CartPersistence;
use crate::session::Session;
use crate::storage::KeyValueStorage;

/// Result of an [`CartEngine::add_to_cart`] call.
#[derive(Debug)]
pub enum AddToCartOutcome {
    /// Remote add succeeded; the local item carries its remote line id.
    Synced(CartState),
    /// No session, so no remote call was attempted. The add is local only.
    LocalOnly(CartState),
    /// Remote add failed or returned no usable line; the local add still
    /// applied, without a line id.
    SyncFailed { state: CartState, error: ApiError },
    /// Dropped because another add was already in flight. Nothing changed.
    Skipped,
}

impl AddToCartOutcome {
    /// Post-transition snapshot, if the call performed a transition.
    #[must_use]
    pub fn state(&self) -> Option<&CartState> {
        match self {
            Self::Synced(state) | Self::LocalOnly(state) | Self::SyncFailed { state, .. } => {
                Some(state)
            }
            Self::Skipped => None,
        }
    }
}

/// Coordinates the local cart with best-effort remote synchronization.
///
/// Cheap to clone; all clones share the same state, subscriber channel, and
/// guard flags.
#[derive(Clone)]
pub struct CartEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    api: Arc<dyn CartApi>,
    session: Session,
    persistence: CartPersistence,
    state: Mutex<CartState>,
    tx: watch::Sender<CartState>,
    adding: AtomicBool,
    synced_remote: AtomicBool,
}

/// Clears the add-in-flight flag when the winning call finishes, including
/// when it is cancelled mid-await.
struct AddInFlight<'a>(&'a AtomicBool);

impl Drop for AddInFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CartEngine {
    /// Construct the engine and rehydrate the persisted cart.
    ///
    /// Hydration runs to completion before the handle exists, so no
    /// operation can observe a pre-hydration state and the initial load can
    /// never trigger a write-back of its own.
    pub async fn start(
        api: Arc<dyn CartApi>,
        storage: Arc<dyn KeyValueStorage>,
        session: Session,
    ) -> Self {
        let persistence = CartPersistence::new(storage);

        let state = match persistence.load().await {
            Some(stored) => reduce(CartState::default(), CartAction::Load { state: stored }),
            None => CartState::default(),
        };

        let (tx, _rx) = watch::channel(state.clone());

        Self {
            inner: Arc::new(EngineInner {
                api,
                session,
                persistence,
                state: Mutex::new(state),
                tx,
                adding: AtomicBool::new(false),
                synced_remote: AtomicBool::new(false),
            }),
        }
    }

    /// Current post-transition snapshot.
    pub async fn state(&self) -> CartState {
        self.inner.state.lock().await.clone()
    }

    /// Watch every post-transition snapshot.
    ///
    /// The receiver starts at the current snapshot; slow receivers observe
    /// only the latest one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.tx.subscribe()
    }

    /// Add a product to the cart.
    ///
    /// When a session exists the remote add runs first so the new item can
    /// carry its remote line id; either way the local add lands. Overlapping
    /// calls are dropped, not queued: the second caller gets
    /// [`AddToCartOutcome::Skipped`] and the cart is untouched.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(&self, product: ItemInput, quantity: u32) -> AddToCartOutcome {
        if self.inner.adding.swap(true, Ordering::SeqCst) {
            debug!("add already in flight, dropping call");
            return AddToCartOutcome::Skipped;
        }
        let _guard = AddInFlight(&self.inner.adding);

        let quantity = quantity.max(1);

        if !self.inner.session.is_authenticated().await {
            let state = self
                .apply(CartAction::AddItem {
                    item: product,
                    initial_quantity: Some(quantity),
                    cart_line_id: None,
                })
                .await;
            return AddToCartOutcome::LocalOnly(state);
        }

        match self.inner.api.add_item(&product.id, i64::from(quantity)).await {
            Ok(cart) => {
                let product_id = product.id.clone();
                let line_id = cart.line_for(&product_id).map(|line| line.id.clone());
                let state = self
                    .apply(CartAction::AddItem {
                        item: product,
                        initial_quantity: Some(quantity),
                        cart_line_id: line_id.clone(),
                    })
                    .await;

                if line_id.is_some() {
                    AddToCartOutcome::Synced(state)
                } else {
                    warn!("remote add returned no line for product, keeping local add");
                    AddToCartOutcome::SyncFailed {
                        state,
                        error: ApiError::MissingLine(product_id),
                    }
                }
            }
            Err(error) => {
                warn!(%error, "remote add failed, keeping local add");
                let state = self
                    .apply(CartAction::AddItem {
                        item: product,
                        initial_quantity: Some(quantity),
                        cart_line_id: None,
                    })
                    .await;
                AddToCartOutcome::SyncFailed { state, error }
            }
        }
    }

    /// Remove an item entirely.
    ///
    /// The remote line is deleted first when the item carries a line id and
    /// a session exists; a remote failure is logged and the local removal
    /// proceeds regardless.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, id: &ProductId) -> CartState {
        let line_id = {
            let state = self.inner.state.lock().await;
            state.item(id).and_then(|item| item.cart_line_id.clone())
        };

        if let Some(line_id) = line_id
            && self.inner.session.is_authenticated().await
            && let Err(error) = self.inner.api.remove_item(&line_id).await
        {
            warn!(%error, "remote remove failed, removing locally anyway");
        }

        self.apply(CartAction::RemoveItem { id: id.clone() }).await
    }

    /// Set an item's quantity.
    ///
    /// Applies locally first; the remote update follows when the item had a
    /// line id and a session exists. A remote failure is logged, never
    /// rolled back.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, id: &ProductId, quantity: i64) -> CartState {
        let line_id = {
            let state = self.inner.state.lock().await;
            state.item(id).and_then(|item| item.cart_line_id.clone())
        };

        let state = self
            .apply(CartAction::UpdateQuantity {
                id: id.clone(),
                quantity,
            })
            .await;

        if let Some(line_id) = line_id
            && self.inner.session.is_authenticated().await
            && let Err(error) = self.inner.api.update_item(&line_id, quantity).await
        {
            warn!(%error, "remote quantity update failed, keeping local value");
        }

        state
    }

    /// Empty the cart everywhere.
    ///
    /// Remote carts are deleted best-effort before the local clear; the
    /// persisted key is removed rather than overwritten with an empty blob.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> CartState {
        if self.inner.session.is_authenticated().await
            && let Err(error) = self.inner.api.clear_carts().await
        {
            warn!(%error, "remote clear failed, clearing locally anyway");
        }

        self.apply_clear().await
    }

    /// Empty the local cart only.
    ///
    /// Logout path: the server cart must survive so it is still there after
    /// the next login.
    #[instrument(skip(self))]
    pub async fn clear_local(&self) -> CartState {
        self.apply_clear().await
    }

    /// Replace the local cart with the remote one, at most once per engine
    /// lifetime.
    ///
    /// Remote lines are deduplicated by product id (first occurrence wins)
    /// and lines with non-positive quantities are skipped. A fetch failure
    /// leaves the local cart untouched. The once-guard stays set after the
    /// first authenticated attempt so a later call cannot resurrect items
    /// the user has since removed.
    #[instrument(skip(self))]
    pub async fn sync_from_remote(&self) -> CartState {
        if !self.inner.session.is_authenticated().await {
            debug!("no session, skipping remote cart sync");
            return self.state().await;
        }

        if self.inner.synced_remote.swap(true, Ordering::SeqCst) {
            debug!("remote cart already synced this session");
            return self.state().await;
        }

        let carts = match self.inner.api.get_carts().await {
            Ok(carts) => carts,
            Err(error) => {
                warn!(%error, "remote cart fetch failed, keeping local cart");
                return self.state().await;
            }
        };

        let rebuilt = rebuild_from_remote(&carts);
        self.apply(CartAction::Load { state: rebuilt }).await
    }

    /// Apply a transition, persist the result, and notify subscribers.
    ///
    /// The persistence write and the subscriber notification both happen
    /// under the state lock, so a later transition's blob or snapshot can
    /// never be overtaken by an earlier one.
    async fn apply(&self, action: CartAction) -> CartState {
        let mut state = self.inner.state.lock().await;
        let next = reduce(state.clone(), action);
        *state = next.clone();
        self.inner.persistence.save(&next).await;
        self.inner.tx.send_replace(next.clone());
        next
    }

    /// Apply `Clear`, removing the storage key instead of writing an empty
    /// blob.
    async fn apply_clear(&self) -> CartState {
        let mut state = self.inner.state.lock().await;
        let next = reduce(state.clone(), CartAction::Clear);
        *state = next.clone();
        self.inner.persistence.clear().await;
        self.inner.tx.send_replace(next.clone());
        next
    }
}

/// Rebuild a cart state from remote carts, deduplicating by product id.
fn rebuild_from_remote(carts: &[RemoteCart]) -> CartState {
    let mut seen: HashSet<ProductId> = HashSet::new();
    let mut state = CartState::default();

    for line in carts.iter().flat_map(|cart| cart.items.iter()) {
        if seen.contains(&line.product_id) {
            continue;
        }
        let Ok(quantity) = u32::try_from(line.quantity) else {
            warn!(
                product_id = %line.product_id,
                quantity = line.quantity,
                "skipping remote line with invalid quantity"
            );
            continue;
        };
        if quantity == 0 {
            continue;
        }

        seen.insert(line.product_id.clone());
        state = reduce(
            state,
            CartAction::AddItem {
                item: ItemInput::from(line),
                initial_quantity: Some(quantity),
                cart_line_id: Some(line.id.clone()),
            },
        );
    }

    state
}
