//! Session-signal-driven mode transitions.

#![allow(clippy::unwrap_used)]

use cartwheel_core::UserId;
use cartwheel_integration_tests::{TestContext, product, wait_for};
use cartwheel_sync::{SessionSignal, session};
use cartwheel_sync::snapshot::SnapshotStore;

#[tokio::test]
async fn test_sign_in_through_the_signal_runs_both_merges() {
    let ctx = TestContext::new();
    ctx.seed("a", 1000);
    ctx.cart.add_item(&product("a", 1000), 2).await.unwrap();
    ctx.wishlist.add_item(&product("a", 1000)).await.unwrap();

    let signal = SessionSignal::new();
    let _driver = tokio::spawn(session::drive(
        signal.subscribe(),
        ctx.cart.clone(),
        ctx.wishlist.clone(),
    ));

    signal.sign_in(UserId::new("user-1"));

    let cart = ctx.cart.clone();
    wait_for("cart to authenticate", move || cart.is_authenticated()).await;
    let wishlist = ctx.wishlist.clone();
    wait_for("wishlist to authenticate", move || {
        wishlist.is_authenticated()
    })
    .await;

    assert_eq!(ctx.cart.items()[0].quantity, 2);
    assert_eq!(ctx.backend.cart_record().items.len(), 1);
    assert!(ctx.cart_snapshot.raw().is_none());
    assert_eq!(ctx.wishlist.items().len(), 1);
}

#[tokio::test]
async fn test_sign_out_through_the_signal_resets_both_engines() {
    let ctx = TestContext::new();
    let a = ctx.seed("a", 1000);

    let signal = SessionSignal::new();
    let _driver = tokio::spawn(session::drive(
        signal.subscribe(),
        ctx.cart.clone(),
        ctx.wishlist.clone(),
    ));

    signal.sign_in(UserId::new("user-1"));
    let cart = ctx.cart.clone();
    wait_for("cart to authenticate", move || cart.is_authenticated()).await;

    ctx.cart.add_item(&a, 1).await.unwrap();

    signal.sign_out();
    let cart = ctx.cart.clone();
    wait_for("cart to reset to guest", move || {
        !cart.is_authenticated()
    })
    .await;

    assert!(ctx.cart.items().is_empty());
    // The server cart is left untouched
    assert_eq!(ctx.backend.cart_record().items.len(), 1);
}

#[tokio::test]
async fn test_failed_merge_keeps_engines_in_guest_mode_for_retry() {
    let ctx = TestContext::new();
    ctx.seed("a", 1000);
    ctx.cart.add_item(&product("a", 1000), 1).await.unwrap();

    ctx.backend.set_offline(true);

    let signal = SessionSignal::new();
    let _driver = tokio::spawn(session::drive(
        signal.subscribe(),
        ctx.cart.clone(),
        ctx.wishlist.clone(),
    ));

    signal.sign_in(UserId::new("user-1"));
    // Give the driver time to process the failed merge
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert!(!ctx.cart.is_authenticated());
    assert_eq!(ctx.cart_snapshot.load(), ctx.cart.items());

    // Connectivity returns; a repeated sign-in event retries the merge
    ctx.backend.set_offline(false);
    signal.sign_out();
    signal.sign_in(UserId::new("user-1"));

    let cart = ctx.cart.clone();
    wait_for("cart to authenticate after retry", move || {
        cart.is_authenticated()
    })
    .await;
    assert_eq!(ctx.cart.items()[0].quantity, 1);
}
