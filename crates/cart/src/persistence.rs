//! Durable mirror of the cart state under a single storage key.
//!
//! Persistence is strictly best-effort: a failed read loads as an empty cart
//! and a failed write leaves the previous blob stale. No storage failure
//! reaches the caller or touches in-memory state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use mercato_core::CartState;

use crate::storage::KeyValueStorage;

/// Storage key for the persisted cart envelope.
///
/// The `v1` suffix names the envelope layout. A future layout change bumps
/// the key instead of migrating blobs in place; an old blob under the old
/// key simply stops being read.
pub const CART_STORAGE_KEY: &str = "mercato.cart.v1";

/// Envelope wrapped around the persisted state.
#[derive(Debug, Serialize, Deserialize)]
struct CartEnvelope {
    saved_at: DateTime<Utc>,
    state: CartState,
}

/// Mirrors [`CartState`] to a [`KeyValueStorage`] backend.
pub struct CartPersistence {
    storage: Arc<dyn KeyValueStorage>,
}

impl CartPersistence {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Load the persisted cart state, if a legible one exists.
    ///
    /// Missing, unreadable, or malformed blobs all load as `None`. The
    /// returned state is exactly what was stored; the caller re-derives
    /// `total`/`item_count` by running it through a `Load` transition.
    pub async fn load(&self) -> Option<CartState> {
        let raw = match self.storage.get(CART_STORAGE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(%error, "failed to read persisted cart, starting empty");
                return None;
            }
        };

        match serde_json::from_str::<CartEnvelope>(&raw) {
            Ok(envelope) => Some(envelope.state),
            Err(error) => {
                warn!(%error, "persisted cart is malformed, starting empty");
                None
            }
        }
    }

    /// Persist a post-transition snapshot.
    pub async fn save(&self, state: &CartState) {
        let envelope = CartEnvelope {
            saved_at: Utc::now(),
            state: state.clone(),
        };

        let raw = match serde_json::to_string(&envelope) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "failed to serialize cart state");
                return;
            }
        };

        if let Err(error) = self.storage.set(CART_STORAGE_KEY, &raw).await {
            warn!(%error, "failed to persist cart state");
        }
    }

    /// Remove the persisted cart outright.
    ///
    /// Used by clear and logout; an empty cart is represented by the absence
    /// of the key, not by an empty blob.
    pub async fn clear(&self) {
        if let Err(error) = self.storage.remove(CART_STORAGE_KEY).await {
            warn!(%error, "failed to remove persisted cart");
        }
    }
}
