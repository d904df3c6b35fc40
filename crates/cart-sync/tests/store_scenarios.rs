//! End-to-end store behavior against the in-memory cart server.

use std::sync::Arc;

use cart_kv::{Cache, KvStore, MemoryStore};
use cart_model::prelude::*;
use cart_sync::prelude::*;
use cart_sync::{GatewayCall, ItemAdded};

fn inr(amount: i64) -> Money {
    Money::new(amount, Currency::INR)
}

fn milk() -> ProductSnapshot {
    ProductSnapshot::new("p-milk", "Milk 1L", inr(3000)).with_storage_id("65af01")
}

fn bread() -> ProductSnapshot {
    ProductSnapshot::new("p-bread", "Bread", inr(4500)).with_storage_id("65af02")
}

fn rice() -> ProductSnapshot {
    ProductSnapshot::new("p-rice", "Basmati Rice", inr(9000))
        .with_variant(VariantRecord::new("v-1", "1 kg", inr(9000)))
        .with_variant(
            VariantRecord::new("v-5", "5 kg", inr(40000)).with_discounted_price(inr(38000)),
        )
}

fn server() -> Arc<MemoryGateway> {
    Arc::new(
        MemoryGateway::new()
            .with_product(milk())
            .with_product(bread())
            .with_product(rice()),
    )
}

fn guest(gateway: &Arc<MemoryGateway>, cache: &Cache) -> CartStore {
    CartStore::new(StoreConfig::default(), cache.clone(), gateway.clone())
}

fn signed_in(gateway: &Arc<MemoryGateway>, cache: &Cache) -> CartStore {
    guest(gateway, cache).with_authenticated(true)
}

fn cache() -> Cache {
    Cache::new(MemoryStore::new())
}

#[tokio::test]
async fn test_either_identifier_targets_the_same_line() {
    let gateway = server();
    let store = guest(&gateway, &cache());

    store.add_item(milk(), None, None).await.unwrap();
    let mut storage_only = milk();
    storage_only.id = None;
    store.add_item(storage_only, None, None).await.unwrap();

    assert_eq!(store.lines().len(), 1);
    assert_eq!(store.quantity_of("65af01", None), 2);

    assert_eq!(
        store.remove_item("65af01", None).await.unwrap(),
        MutationOutcome::Local
    );
    assert!(store.lines().is_empty());
}

#[tokio::test]
async fn test_repeat_add_coalesces_quantity() {
    let gateway = server();
    let store = guest(&gateway, &cache());

    store.add_item(milk(), None, None).await.unwrap();
    store.add_item(milk(), None, None).await.unwrap();

    let lines = store.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
}

#[tokio::test]
async fn test_variants_are_separate_lines() {
    let gateway = server();
    let store = guest(&gateway, &cache());

    store
        .add_item(rice(), Some(VariantSelector::from("v-1")), None)
        .await
        .unwrap();
    store
        .add_item(rice(), Some(VariantSelector::from("5 kg")), None)
        .await
        .unwrap();
    assert_eq!(store.lines().len(), 2);

    store
        .update_quantity("p-rice", 4, Some(&VariantRef::by_title("5 kg")))
        .await
        .unwrap();

    assert_eq!(store.quantity_of("p-rice", Some(&VariantRef::by_id("v-5"))), 4);
    assert_eq!(store.quantity_of("p-rice", Some(&VariantRef::by_id("v-1"))), 1);
    assert_eq!(store.quantity_of("p-rice", None), 5);
    assert_eq!(store.aggregate().subtotal, inr(9000 + 4 * 38000));
}

#[tokio::test]
async fn test_variants_of_one_product_update_concurrently() {
    let gateway = server();
    let store = Arc::new(signed_in(&gateway, &cache()));
    for key in ["v-1", "v-5"] {
        store
            .add_item(rice(), Some(VariantSelector::from(key)), None)
            .await
            .unwrap();
    }
    let calls_before = gateway.call_count();
    gateway.hold();

    let small = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_quantity("p-rice", 3, Some(&VariantRef::by_id("v-1")))
                .await
        }
    });
    gateway.wait_for_in_flight(1).await;

    assert_eq!(
        store
            .update_quantity("p-rice", 6, Some(&VariantRef::by_id("v-1")))
            .await
            .unwrap(),
        MutationOutcome::Skipped
    );

    let large = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .update_quantity("p-rice", 2, Some(&VariantRef::by_id("v-5")))
                .await
        }
    });
    gateway.wait_for_in_flight(2).await;

    let updates = gateway.calls()[calls_before..]
        .iter()
        .filter(|c| matches!(c, GatewayCall::UpdateQuantity { .. }))
        .count();
    assert_eq!(updates, 2);

    gateway.resume();
    assert_eq!(small.await.unwrap().unwrap(), MutationOutcome::Synced);
    assert_eq!(large.await.unwrap().unwrap(), MutationOutcome::Synced);
    assert_eq!(store.quantity_of("p-rice", Some(&VariantRef::by_id("v-1"))), 3);
    assert_eq!(store.quantity_of("p-rice", Some(&VariantRef::by_id("v-5"))), 2);
}

#[tokio::test]
async fn test_rapid_repeat_add_is_dropped_not_queued() {
    let gateway = server();
    let store = Arc::new(signed_in(&gateway, &cache()));
    gateway.hold();

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.add_item(milk(), None, None).await }
    });
    gateway.wait_for_in_flight(1).await;
    assert!(store.is_pending("p-milk"));
    assert!(store.is_pending("65af01"));

    assert_eq!(
        store.add_item(milk(), None, None).await.unwrap(),
        MutationOutcome::Skipped
    );
    assert_eq!(store.quantity_of("p-milk", None), 1);
    assert_eq!(gateway.add_count(), 1);

    gateway.resume();
    assert_eq!(first.await.unwrap().unwrap(), MutationOutcome::Synced);
    assert!(!store.is_pending("p-milk"));

    assert_eq!(
        store.add_item(milk(), None, None).await.unwrap(),
        MutationOutcome::Synced
    );
    assert_eq!(store.quantity_of("p-milk", None), 2);
    assert_eq!(gateway.add_count(), 2);
}

#[tokio::test]
async fn test_remove_and_update_wait_out_an_add_in_flight() {
    let gateway = server();
    let store = Arc::new(signed_in(&gateway, &cache()));
    store.add_item(milk(), None, None).await.unwrap();
    gateway.hold();

    let add = tokio::spawn({
        let store = store.clone();
        async move { store.add_item(milk(), None, None).await }
    });
    gateway.wait_for_in_flight(1).await;
    let calls = gateway.call_count();

    assert_eq!(
        store.remove_item("p-milk", None).await.unwrap(),
        MutationOutcome::Skipped
    );
    assert_eq!(
        store.update_quantity("65af01", 5, None).await.unwrap(),
        MutationOutcome::Skipped
    );
    assert_eq!(
        store.update_quantity("p-milk", 0, None).await.unwrap(),
        MutationOutcome::Skipped
    );
    assert_eq!(gateway.call_count(), calls);
    assert_eq!(store.quantity_of("p-milk", None), 2);

    gateway.resume();
    assert_eq!(add.await.unwrap().unwrap(), MutationOutcome::Synced);
    assert_eq!(store.quantity_of("p-milk", None), 2);
}

#[tokio::test]
async fn test_different_products_do_not_block() {
    let gateway = server();
    let store = Arc::new(signed_in(&gateway, &cache()));
    gateway.hold();

    let tasks: Vec<_> = [milk(), bread()]
        .into_iter()
        .map(|product| {
            let store = store.clone();
            tokio::spawn(async move { store.add_item(product, None, None).await })
        })
        .collect();
    gateway.wait_for_in_flight(2).await;
    assert_eq!(store.lines().len(), 2);

    gateway.resume();
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), MutationOutcome::Synced);
    }
    let lines = store.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.line_id.is_some()));
}

#[tokio::test]
async fn test_failed_calls_restore_previous_lines() {
    let gateway = server();
    let cache = cache();
    let store = signed_in(&gateway, &cache);

    store.add_item(milk(), None, None).await.unwrap();
    store.add_item(bread(), None, None).await.unwrap();
    let before = store.lines();

    gateway.fail_next(1);
    let err = store.add_item(milk(), None, None).await.unwrap_err();
    assert_eq!(err.action(), Some(CartAction::Add));
    assert_eq!(store.lines(), before);

    gateway.fail_next(1);
    let err = store.update_quantity("p-bread", 7, None).await.unwrap_err();
    assert_eq!(err.action(), Some(CartAction::UpdateQuantity));
    assert_eq!(store.lines(), before);

    gateway.fail_next(1);
    let err = store.remove_item("65af01", None).await.unwrap_err();
    assert_eq!(err.action(), Some(CartAction::Remove));
    assert!(err.user_message().contains("remove item from cart"));
    assert_eq!(store.lines(), before);

    // The persisted copy was rolled back as well.
    assert_eq!(guest(&gateway, &cache).lines(), before);
}

#[tokio::test]
async fn test_failed_call_leaves_other_synced_lines_alone() {
    let gateway = server();
    let cache = cache();
    let store = Arc::new(signed_in(&gateway, &cache));
    store.add_item(bread(), None, None).await.unwrap();
    let bread_before = store.state().find("p-bread", None).cloned().unwrap();
    gateway.hold();

    let milk_add = tokio::spawn({
        let store = store.clone();
        async move { store.add_item(milk(), None, None).await }
    });
    gateway.wait_for_in_flight(1).await;
    let bread_add = tokio::spawn({
        let store = store.clone();
        async move { store.add_item(bread(), None, None).await }
    });
    gateway.wait_for_in_flight(2).await;

    gateway.release(1);
    assert_eq!(milk_add.await.unwrap().unwrap(), MutationOutcome::Synced);
    gateway.fail_next(1);
    gateway.release(1);
    assert!(bread_add.await.unwrap().is_err());

    let state = store.state();
    assert_eq!(state.find("p-bread", None), Some(&bread_before));
    let milk_line = state.find("p-milk", None).unwrap();
    assert!(milk_line.line_id.is_some());
    assert_eq!(guest(&gateway, &cache).lines(), state.lines);

    assert_eq!(
        store.remove_item("p-milk", None).await.unwrap(),
        MutationOutcome::Synced
    );
    let server_lines = gateway.server_snapshot().lines;
    assert_eq!(server_lines.len(), 1);
    assert_eq!(server_lines[0].quantity, 1);
    assert_eq!(store.lines(), vec![bread_before]);
}

#[tokio::test]
async fn test_guest_cart_never_touches_the_network() {
    let gateway = server();
    let store = guest(&gateway, &cache());
    let p = ProductSnapshot::new("p", "P", inr(3000));

    store.add_item(p.clone(), None, None).await.unwrap();
    store.add_item(p, None, None).await.unwrap();
    assert_eq!(
        store.update_quantity("p", 5, None).await.unwrap(),
        MutationOutcome::Local
    );

    let cart = store.aggregate();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.item_count, 5);
    assert_eq!(cart.subtotal, inr(15000));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_server_fees_pass_through() {
    let gateway = Arc::new(
        MemoryGateway::new().with_product(milk()).with_fees(FeeSummary {
            delivery_fee: Some(inr(0)),
            platform_fee: Some(inr(500)),
            free_delivery_threshold: None,
        }),
    );
    let store = signed_in(&gateway, &cache());

    assert_eq!(
        store.add_item(milk(), None, None).await.unwrap(),
        MutationOutcome::Synced
    );

    let cart = store.aggregate();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].line.quantity, 1);
    assert_eq!(cart.lines[0].line.line_id, Some(LineId::new("line-1")));
    assert_eq!(cart.fees.delivery_fee, Some(inr(0)));
    assert_eq!(cart.fees.platform_fee, Some(inr(500)));
}

#[tokio::test]
async fn test_update_to_zero_removes_on_server() {
    let gateway = server();
    let store = signed_in(&gateway, &cache());
    store.add_item(milk(), None, None).await.unwrap();

    assert_eq!(
        store.update_quantity("p-milk", 0, None).await.unwrap(),
        MutationOutcome::Synced
    );
    assert!(store.lines().is_empty());
    assert!(matches!(
        gateway.calls().last(),
        Some(GatewayCall::Remove { .. })
    ));
}

#[tokio::test]
async fn test_unconfirmed_clear_reloads_from_server() {
    let gateway = server();
    gateway.seed_line(milk(), 2, None);
    let store = signed_in(&gateway, &cache());
    store.refresh(None).await.unwrap();
    assert_eq!(store.quantity_of("p-milk", None), 2);

    gateway.fail_next(1);
    assert_eq!(
        store.clear_cart().await.unwrap(),
        MutationOutcome::Refreshed
    );
    assert_eq!(store.quantity_of("p-milk", None), 2);
}

#[tokio::test]
async fn test_clear_is_kept_when_refresh_also_fails() {
    let gateway = server();
    gateway.seed_line(milk(), 2, None);
    let store = signed_in(&gateway, &cache());
    store.refresh(None).await.unwrap();

    gateway.set_offline(true);
    let err = store.clear_cart().await.unwrap_err();
    assert!(matches!(err, CartError::ClearUnconfirmed { .. }));
    assert!(store.lines().is_empty());
}

#[tokio::test]
async fn test_identity_transitions() {
    let gateway = server();
    gateway.seed_line(bread(), 3, None);
    let cache = cache();
    let store = guest(&gateway, &cache);

    store.set_authenticated(true).await.unwrap();
    assert!(store.state().is_server_backed());
    assert_eq!(store.quantity_of("p-bread", None), 3);

    store.set_authenticated(false).await.unwrap();
    assert!(store.lines().is_empty());
    assert!(guest(&gateway, &cache).lines().is_empty());

    // A guest cart survives a redundant sign-out.
    store.add_item(milk(), None, None).await.unwrap();
    store.set_authenticated(false).await.unwrap();
    assert_eq!(store.lines().len(), 1);
}

#[tokio::test]
async fn test_location_is_forwarded() {
    let gateway = server();
    let store = signed_in(&gateway, &cache());

    store.set_location(Some(GeoPoint::new(12.97, 77.59)));
    store.add_item(milk(), None, None).await.unwrap();
    assert_eq!(gateway.last_geo(), Some(GeoPoint::new(12.97, 77.59)));

    store.refresh(Some(GeoPoint::new(19.07, 72.87))).await.unwrap();
    assert_eq!(gateway.last_geo(), Some(GeoPoint::new(19.07, 72.87)));
}

#[tokio::test]
async fn test_hydration_discards_corrupt_entries() {
    let cache = cache();
    let raw = serde_json::json!([
        {"product": null, "quantity": 1},
        {"product": {"_id": "65af01", "name": "Milk 1L",
                     "price": {"amount_minor": 3000, "currency": "INR"}},
         "quantity": 2},
        {"product": {"id": "p-eggs"}, "quantity": "many"}
    ]);
    cache.set("cart:items", &raw).unwrap();

    let store = guest(&server(), &cache);
    let lines = store.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(store.aggregate().subtotal, inr(6000));
}

#[tokio::test]
async fn test_hydration_survives_unparseable_storage() {
    let backend = MemoryStore::new();
    backend.set("cart:items", b"{{{{").unwrap();
    let store = guest(&server(), &Cache::new(backend));
    assert!(store.lines().is_empty());
}

#[tokio::test]
async fn test_add_emits_event_and_notifies_watchers() {
    let store = guest(&server(), &cache());
    let mut events = store.notifier().subscribe();
    let mut state = store.subscribe();

    store
        .add_item(milk(), None, Some(AddOrigin::new(120.0, 640.0)))
        .await
        .unwrap();

    match events.recv().await.unwrap() {
        NotifierEvent::Added(ItemAdded {
            product, origin, ..
        }) => {
            assert!(product.matches_id("p-milk"));
            assert_eq!(origin, Some(AddOrigin::new(120.0, 640.0)));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(state.has_changed().unwrap());
    assert_eq!(state.borrow_and_update().lines.len(), 1);
}
