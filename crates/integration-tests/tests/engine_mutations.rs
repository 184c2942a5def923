//! Engine scenarios for remove, update and clear.
//!
//! All three mutations treat the backend as best effort: the local transition
//! is never blocked or rolled back because a remote call failed.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use mercato_cart::engine::CartEngine;
use mercato_cart::persistence::CART_STORAGE_KEY;
use mercato_cart::storage::{KeyValueStorage, MemoryStorage};
use mercato_core::{CartLineId, ProductId};
use mercato_integration_tests::{
    ApiCall, ScriptedCartApi, authenticated_session, engine_with, local_engine, sample_item,
};

// ==== remove ====

#[tokio::test]
async fn test_remove_deletes_remote_line_and_local_item() {
    let api = Arc::new(ScriptedCartApi::new());
    let engine = engine_with(api.clone()).await;
    engine.add_to_cart(sample_item("1"), 2).await;

    let state = engine.remove_item(&ProductId::from("1")).await;

    assert!(state.is_empty());
    assert!(api.calls().await.contains(&ApiCall::RemoveItem {
        cart_line_id: CartLineId::from("line-1"),
    }));
}

#[tokio::test]
async fn test_remove_without_line_id_skips_remote() {
    let api = Arc::new(ScriptedCartApi::new());
    api.fail_add.store(true, Ordering::SeqCst);
    let engine = engine_with(api.clone()).await;

    // The failed add leaves a local item with no remote line attached.
    engine.add_to_cart(sample_item("1"), 1).await;
    api.fail_add.store(false, Ordering::SeqCst);

    let state = engine.remove_item(&ProductId::from("1")).await;

    assert!(state.is_empty());
    let remove_calls = api
        .count_calls(|call| matches!(call, ApiCall::RemoveItem { .. }))
        .await;
    assert_eq!(remove_calls, 0);
}

#[tokio::test]
async fn test_failed_remote_remove_still_removes_locally() {
    let api = Arc::new(ScriptedCartApi::new());
    let engine = engine_with(api.clone()).await;
    engine.add_to_cart(sample_item("1"), 1).await;
    api.fail_remove.store(true, Ordering::SeqCst);

    let state = engine.remove_item(&ProductId::from("1")).await;

    assert!(state.is_empty());
    assert!(engine.state().await.is_empty());
    // The remote delete was attempted even though it failed.
    let remove_calls = api
        .count_calls(|call| matches!(call, ApiCall::RemoveItem { .. }))
        .await;
    assert_eq!(remove_calls, 1);
}

// ==== update ====

#[tokio::test]
async fn test_update_quantity_applies_locally_then_syncs() {
    let api = Arc::new(ScriptedCartApi::new());
    let engine = engine_with(api.clone()).await;
    engine.add_to_cart(sample_item("1"), 1).await;

    let state = engine.update_quantity(&ProductId::from("1"), 5).await;

    assert_eq!(state.items[0].quantity, 5);
    assert!(api.calls().await.contains(&ApiCall::UpdateItem {
        cart_line_id: CartLineId::from("line-1"),
        quantity: 5,
    }));
}

#[tokio::test]
async fn test_failed_remote_update_keeps_local_value() {
    let api = Arc::new(ScriptedCartApi::new());
    let engine = engine_with(api.clone()).await;
    engine.add_to_cart(sample_item("1"), 1).await;
    api.fail_update.store(true, Ordering::SeqCst);

    let state = engine.update_quantity(&ProductId::from("1"), 4).await;

    assert_eq!(state.items[0].quantity, 4);
    assert_eq!(engine.state().await.items[0].quantity, 4);
}

#[tokio::test]
async fn test_update_to_zero_removes_item_and_tells_remote() {
    let api = Arc::new(ScriptedCartApi::new());
    let engine = engine_with(api.clone()).await;
    engine.add_to_cart(sample_item("1"), 3).await;

    let state = engine.update_quantity(&ProductId::from("1"), 0).await;

    assert!(state.is_empty());
    // The backend receives the raw zero and performs its own removal.
    assert!(api.calls().await.contains(&ApiCall::UpdateItem {
        cart_line_id: CartLineId::from("line-1"),
        quantity: 0,
    }));
}

#[tokio::test]
async fn test_update_without_session_makes_no_remote_call() {
    let api = Arc::new(ScriptedCartApi::new());
    let engine = local_engine(api.clone()).await;
    engine.add_to_cart(sample_item("1"), 1).await;

    let state = engine.update_quantity(&ProductId::from("1"), 3).await;

    assert_eq!(state.items[0].quantity, 3);
    assert!(api.calls().await.is_empty());
}

// ==== clear ====

#[tokio::test]
async fn test_clear_empties_remote_local_and_storage() {
    let api = Arc::new(ScriptedCartApi::new());
    let storage = Arc::new(MemoryStorage::new());
    let engine = CartEngine::start(api.clone(), storage.clone(), authenticated_session()).await;
    engine.add_to_cart(sample_item("1"), 2).await;
    assert!(storage.get(CART_STORAGE_KEY).await.unwrap().is_some());

    let state = engine.clear().await;

    assert!(state.is_empty());
    assert!(api.calls().await.contains(&ApiCall::ClearCarts));
    assert!(storage.get(CART_STORAGE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_remote_clear_still_clears_locally() {
    let api = Arc::new(ScriptedCartApi::new());
    let storage = Arc::new(MemoryStorage::new());
    let engine = CartEngine::start(api.clone(), storage.clone(), authenticated_session()).await;
    engine.add_to_cart(sample_item("1"), 2).await;
    api.fail_clear.store(true, Ordering::SeqCst);

    let state = engine.clear().await;

    assert!(state.is_empty());
    assert!(storage.get(CART_STORAGE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_clear_local_never_touches_remote() {
    let api = Arc::new(ScriptedCartApi::new());
    let storage = Arc::new(MemoryStorage::new());
    let engine = CartEngine::start(api.clone(), storage.clone(), authenticated_session()).await;
    engine.add_to_cart(sample_item("1"), 2).await;
    let calls_before = api.calls().await.len();

    let state = engine.clear_local().await;

    assert!(state.is_empty());
    assert_eq!(api.calls().await.len(), calls_before);
    assert!(storage.get(CART_STORAGE_KEY).await.unwrap().is_none());
}
