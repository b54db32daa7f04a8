//! The sign-in merge protocol.

#![allow(clippy::unwrap_used)]

use cartwheel_core::{CartRecord, ProductId, UserId};
use cartwheel_integration_tests::{TestContext, product};
use cartwheel_sync::EngineError;
use cartwheel_sync::snapshot::SnapshotStore;

fn user() -> UserId {
    UserId::new("user-1")
}

// =============================================================================
// Merge Correctness
// =============================================================================

#[tokio::test]
async fn test_merge_drops_unresolvable_lines_and_discloses_them() {
    let ctx = TestContext::new();
    ctx.seed("a", 1000);
    ctx.seed("b", 500);

    ctx.cart.add_item(&product("a", 1000), 2).await.unwrap();
    ctx.cart.add_item(&product("b", 500), 1).await.unwrap();

    // Product b disappears from the catalog before sign-in
    ctx.backend.remove_product(&ProductId::new("b"));

    let outcome = ctx.cart.handle_sign_in(user()).await.unwrap();

    let items = ctx.cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, ProductId::new("a"));
    assert_eq!(items[0].quantity, 2);

    assert_eq!(outcome.dropped_products, vec!["Product b".to_string()]);
    assert!(ctx.cart_snapshot.raw().is_none());
    assert!(ctx.cart.is_authenticated());
}

#[tokio::test]
async fn test_merge_folds_guest_lines_into_existing_server_cart() {
    let ctx = TestContext::new();
    let a = ctx.seed("a", 1000);

    // A cart from an earlier authenticated session already holds 1×a
    ctx.backend.set_cart_record(CartRecord {
        items: vec![cartwheel_core::CartItem::new(&a, 1)],
    });

    ctx.cart.add_item(&a, 2).await.unwrap();
    ctx.cart.handle_sign_in(user()).await.unwrap();

    let items = ctx.cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
}

#[tokio::test]
async fn test_end_to_end_guest_to_account() {
    let ctx = TestContext::new();
    let x = ctx.seed("x", 2000);

    // Guest adds product x
    ctx.cart.add_item(&x, 1).await.unwrap();
    let stored = ctx.cart_snapshot.load();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].quantity, 1);

    // Sign-in with no prior remote cart
    let outcome = ctx.cart.handle_sign_in(user()).await.unwrap();

    assert!(outcome.is_clean());
    let items = ctx.cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, ProductId::new("x"));
    assert_eq!(items[0].quantity, 1);
    assert!(ctx.cart_snapshot.raw().is_none());
}

#[tokio::test]
async fn test_sign_in_with_empty_snapshot_adopts_server_cart() {
    let ctx = TestContext::new();
    let a = ctx.seed("a", 1500);
    ctx.backend.set_cart_record(CartRecord {
        items: vec![cartwheel_core::CartItem::new(&a, 4)],
    });

    let outcome = ctx.cart.handle_sign_in(user()).await.unwrap();

    assert!(outcome.is_clean());
    assert_eq!(ctx.cart.items()[0].quantity, 4);
}

// =============================================================================
// Merge Atomicity and Retry
// =============================================================================

#[tokio::test]
async fn test_failed_merge_keeps_snapshot_and_guest_state() {
    let ctx = TestContext::new();
    ctx.seed("a", 1000);
    ctx.seed("b", 500);
    ctx.cart.add_item(&product("a", 1000), 2).await.unwrap();
    ctx.cart.add_item(&product("b", 500), 1).await.unwrap();
    let before = ctx.cart.items();

    ctx.backend.set_offline(true);
    let err = ctx.cart.handle_sign_in(user()).await.unwrap_err();

    assert!(matches!(err, EngineError::Unreachable(_)));
    assert!(!ctx.cart.is_authenticated());
    assert_eq!(ctx.cart.items(), before);
    assert_eq!(ctx.cart_snapshot.load(), before);
}

#[tokio::test]
async fn test_merge_can_be_retried_after_failure() {
    let ctx = TestContext::new();
    ctx.seed("a", 1000);
    ctx.cart.add_item(&product("a", 1000), 2).await.unwrap();

    ctx.backend.fail_next();
    assert!(ctx.cart.handle_sign_in(user()).await.is_err());

    // The snapshot is intact, so a retried sign-in merges the same lines
    let outcome = ctx.cart.handle_sign_in(user()).await.unwrap();
    assert!(outcome.is_clean());
    assert_eq!(ctx.cart.items()[0].quantity, 2);
    assert!(ctx.cart.is_authenticated());
}

#[tokio::test]
async fn test_merge_runs_at_most_once_per_sign_in() {
    let ctx = TestContext::new();
    ctx.seed("a", 1000);
    ctx.cart.add_item(&product("a", 1000), 1).await.unwrap();
    ctx.cart.handle_sign_in(user()).await.unwrap();
    let after_first = ctx.cart.items();

    // A stray snapshot appearing while authenticated must not be merged
    ctx.cart_snapshot
        .set_raw(r#"[{"productId":"a","name":"Product a","price":"10.00","image":null,"quantity":9}]"#);
    let outcome = ctx.cart.handle_sign_in(user()).await.unwrap();

    assert!(outcome.is_clean());
    assert_eq!(ctx.cart.items(), after_first);
}

// =============================================================================
// Authenticated Mode
// =============================================================================

#[tokio::test]
async fn test_authenticated_mutations_never_write_the_snapshot() {
    let ctx = TestContext::new();
    let a = ctx.seed("a", 1000);
    ctx.cart.handle_sign_in(user()).await.unwrap();

    ctx.cart.add_item(&a, 2).await.unwrap();
    ctx.cart.update_item(&a.product_id, 5).await.unwrap();
    ctx.cart.remove_item(&a.product_id).await.unwrap();

    assert!(ctx.cart_snapshot.raw().is_none());
}

#[tokio::test]
async fn test_authenticated_list_mirrors_server_record() {
    let ctx = TestContext::new();
    let a = ctx.seed("a", 1000);
    ctx.cart.handle_sign_in(user()).await.unwrap();

    ctx.cart.add_item(&a, 2).await.unwrap();

    assert_eq!(ctx.cart.items(), ctx.backend.cart_record().items);
}

#[tokio::test]
async fn test_remote_failure_leaves_in_memory_list_unchanged() {
    let ctx = TestContext::new();
    let a = ctx.seed("a", 1000);
    ctx.cart.handle_sign_in(user()).await.unwrap();
    ctx.cart.add_item(&a, 2).await.unwrap();
    let before = ctx.cart.items();

    ctx.backend.fail_next();
    let err = ctx.cart.add_item(&a, 1).await.unwrap_err();

    assert!(matches!(err, EngineError::Unreachable(_)));
    assert_eq!(ctx.cart.items(), before);
}

#[tokio::test]
async fn test_expired_session_surfaces_unauthorized_without_corrupting_state() {
    let ctx = TestContext::new();
    let a = ctx.seed("a", 1000);
    ctx.cart.handle_sign_in(user()).await.unwrap();
    ctx.cart.add_item(&a, 2).await.unwrap();
    let before = ctx.cart.items();

    ctx.backend.set_unauthorized(true);
    let err = ctx.cart.add_item(&a, 1).await.unwrap_err();

    assert!(matches!(err, EngineError::Unauthorized(_)));
    assert_eq!(ctx.cart.items(), before);
}

#[tokio::test]
async fn test_unresolvable_product_on_authenticated_add_is_invalid_input() {
    let ctx = TestContext::new();
    ctx.cart.handle_sign_in(user()).await.unwrap();

    let err = ctx
        .cart
        .add_item(&product("never-seeded", 1000), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

// =============================================================================
// Sign-out
// =============================================================================

#[tokio::test]
async fn test_sign_out_resets_to_empty_guest_and_leaves_server_cart() {
    let ctx = TestContext::new();
    let a = ctx.seed("a", 1000);
    ctx.cart.handle_sign_in(user()).await.unwrap();
    ctx.cart.add_item(&a, 2).await.unwrap();

    ctx.cart.handle_sign_out().await;

    assert!(!ctx.cart.is_authenticated());
    assert!(ctx.cart.items().is_empty());
    // The server cart is untouched for the next sign-in
    assert_eq!(ctx.backend.cart_record().items.len(), 1);
}
