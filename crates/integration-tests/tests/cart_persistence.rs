//! Engine scenarios for the persistence boundary.
//!
//! Storage blobs are untrusted input: stale derived fields are recomputed,
//! zero quantities are dropped, duplicated ids collapse to their first
//! entry and unreadable blobs fall back to an empty cart. Hydration itself
//! never writes; only transitions do.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use mercato_cart::engine::CartEngine;
use mercato_cart::persistence::CART_STORAGE_KEY;
use mercato_cart::session::Session;
use mercato_cart::storage::{FileStorage, KeyValueStorage, MemoryStorage};
use mercato_core::{CartState, ProductId};
use mercato_integration_tests::{ScriptedCartApi, sample_item};
use rust_decimal::Decimal;

async fn engine_on(storage: Arc<dyn KeyValueStorage>) -> CartEngine {
    CartEngine::start(Arc::new(ScriptedCartApi::new()), storage, Session::default()).await
}

/// Envelope with one line of Oat Milk x2 and deliberately wrong totals.
const STALE_BLOB: &str = r#"{
  "saved_at": "2026-08-01T12:00:00Z",
  "state": {
    "items": [
      {
        "id": "42",
        "name": "Oat Milk",
        "price": "3.49",
        "image": null,
        "market_id": "9",
        "market_name": "Central Market",
        "quantity": 2,
        "cart_line_id": null
      }
    ],
    "total": "999",
    "item_count": 77
  }
}"#;

#[tokio::test]
async fn test_engine_rehydrates_from_shared_storage() {
    let storage = Arc::new(MemoryStorage::new());

    let first = engine_on(storage.clone()).await;
    first.add_to_cart(sample_item("1"), 2).await;
    first.add_to_cart(sample_item("2"), 1).await;
    let saved = first.state().await;

    let second = engine_on(storage).await;

    assert_eq!(second.state().await, saved);
}

#[tokio::test]
async fn test_rehydration_recomputes_stale_derived_fields() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(CART_STORAGE_KEY, STALE_BLOB).await.unwrap();

    let engine = engine_on(storage).await;
    let state = engine.state().await;

    assert_eq!(state.items.len(), 1);
    assert_eq!(state.total, Decimal::new(698, 2));
    assert_eq!(state.item_count, 2);
}

#[tokio::test]
async fn test_zero_quantity_lines_dropped_on_rehydration() {
    let storage = Arc::new(MemoryStorage::new());
    let blob = serde_json::json!({
        "saved_at": "2026-08-01T12:00:00Z",
        "state": {
            "items": [
                {
                    "id": "1",
                    "name": "Ghost",
                    "price": "1.00",
                    "image": null,
                    "market_id": "m1",
                    "market_name": "Central Market",
                    "quantity": 0,
                    "cart_line_id": null
                },
                {
                    "id": "2",
                    "name": "Keeper",
                    "price": "2.00",
                    "image": null,
                    "market_id": "m1",
                    "market_name": "Central Market",
                    "quantity": 2,
                    "cart_line_id": null
                }
            ],
            "total": "0",
            "item_count": 0
        }
    });
    storage
        .set(CART_STORAGE_KEY, &blob.to_string())
        .await
        .unwrap();

    let engine = engine_on(storage).await;
    let state = engine.state().await;

    assert!(state.item(&ProductId::from("1")).is_none());
    assert_eq!(state.item(&ProductId::from("2")).unwrap().quantity, 2);
    assert_eq!(state.total, Decimal::new(400, 2));
}

#[tokio::test]
async fn test_duplicate_ids_collapse_to_first_on_rehydration() {
    let storage = Arc::new(MemoryStorage::new());
    let blob = serde_json::json!({
        "saved_at": "2026-08-01T12:00:00Z",
        "state": {
            "items": [
                {
                    "id": "1",
                    "name": "Oat Milk",
                    "price": "2.50",
                    "image": null,
                    "market_id": "m1",
                    "market_name": "Central Market",
                    "quantity": 2,
                    "cart_line_id": null
                },
                {
                    "id": "1",
                    "name": "Oat Milk",
                    "price": "2.50",
                    "image": null,
                    "market_id": "m1",
                    "market_name": "Central Market",
                    "quantity": 5,
                    "cart_line_id": "line-dup"
                }
            ],
            "total": "17.50",
            "item_count": 7
        }
    });
    storage
        .set(CART_STORAGE_KEY, &blob.to_string())
        .await
        .unwrap();

    let engine = engine_on(storage).await;
    let state = engine.state().await;

    assert_eq!(state.items.len(), 1);
    let item = state.item(&ProductId::from("1")).unwrap();
    assert_eq!(item.quantity, 2);
    assert_eq!(item.cart_line_id, None);
    assert_eq!(state.total, Decimal::new(500, 2));
    assert_eq!(state.item_count, 2);
}

#[tokio::test]
async fn test_unreadable_blob_falls_back_to_empty_cart() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(CART_STORAGE_KEY, "{definitely not json")
        .await
        .unwrap();

    let engine = engine_on(storage.clone()).await;

    assert!(engine.state().await.is_empty());
    // The broken blob is left alone until the next real transition.
    assert_eq!(
        storage.get(CART_STORAGE_KEY).await.unwrap().as_deref(),
        Some("{definitely not json")
    );
}

#[tokio::test]
async fn test_hydration_reads_without_writing_back() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(CART_STORAGE_KEY, STALE_BLOB).await.unwrap();

    let engine = engine_on(storage.clone()).await;
    assert_eq!(
        storage.get(CART_STORAGE_KEY).await.unwrap().as_deref(),
        Some(STALE_BLOB)
    );

    // The first transition rewrites the blob with corrected fields.
    engine.update_quantity(&ProductId::from("42"), 3).await;
    let rewritten = storage.get(CART_STORAGE_KEY).await.unwrap().unwrap();
    assert_ne!(rewritten, STALE_BLOB);

    let envelope: serde_json::Value = serde_json::from_str(&rewritten).unwrap();
    let state: CartState = serde_json::from_value(envelope["state"].clone()).unwrap();
    assert_eq!(state.items[0].quantity, 3);
    assert_eq!(state.total, Decimal::new(1047, 2));
}

#[tokio::test]
async fn test_every_transition_persists_a_snapshot() {
    let storage = Arc::new(MemoryStorage::new());
    let engine = engine_on(storage.clone()).await;

    let stored_state = |raw: String| -> CartState {
        let envelope: serde_json::Value = serde_json::from_str(&raw).unwrap();
        serde_json::from_value(envelope["state"].clone()).unwrap()
    };

    engine.add_to_cart(sample_item("1"), 2).await;
    let raw = storage.get(CART_STORAGE_KEY).await.unwrap().unwrap();
    assert_eq!(stored_state(raw).item_count, 2);

    engine.update_quantity(&ProductId::from("1"), 5).await;
    let raw = storage.get(CART_STORAGE_KEY).await.unwrap().unwrap();
    assert_eq!(stored_state(raw).item_count, 5);

    engine.remove_item(&ProductId::from("1")).await;
    let raw = storage.get(CART_STORAGE_KEY).await.unwrap().unwrap();
    assert!(stored_state(raw).is_empty());
}

#[tokio::test]
async fn test_file_storage_survives_engine_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first_storage = Arc::new(FileStorage::create(dir.path()).await.unwrap());
    let first = engine_on(first_storage).await;
    first.add_to_cart(sample_item("1"), 2).await;
    first.add_to_cart(sample_item("2"), 1).await;
    let saved = first.state().await;
    drop(first);

    let second_storage = Arc::new(FileStorage::create(dir.path()).await.unwrap());
    let second = engine_on(second_storage).await;

    assert_eq!(second.state().await, saved);
    assert_eq!(second.state().await.total, Decimal::new(750, 2));
}
