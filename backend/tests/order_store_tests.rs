//! Order store tests
//!
//! Exercises the in-memory store through the `OrderStore` contract:
//! - Totals recomputed from catalog prices
//! - Case-insensitive status filtering
//! - Exact-match status updates, with the transition policy applied under the write
//! - Atomic order insertion with the default status

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{dec, utc, Fixture};
use order_management::store::memory::StoredOrder;
use order_management::store::{InMemoryOrderStore, OrderStore};
use order_management::AppError;
use rust_decimal::Decimal;
use shared::{AnyTransition, CompletedIsFinal};
use uuid::Uuid;

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_empty_store_lists_nothing() {
    let fixture = Fixture::new();
    assert!(fixture.store.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_orders_computes_totals() {
    let fixture = Fixture::new();
    let order_id = fixture.import(
        "Created",
        utc(2023, 5, 1),
        &[(&fixture.mailbox, Some(3)), (&fixture.archiving, Some(2))],
    );

    let orders = fixture.store.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);

    let summary = &orders[0];
    assert_eq!(summary.header.id, order_id);
    assert_eq!(summary.header.status_name, "Created");
    assert_eq!(summary.item_count, 2);
    // 3 x 0.8 + 2 x 0.5
    assert_eq!(summary.total_cost, dec("3.4"));
    // 3 x 0.9 + 2 x 0.7
    assert_eq!(summary.total_price, dec("4.1"));
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let fixture = Fixture::new();
    let older = fixture.import("Created", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);
    let newest = fixture.import("Completed", utc(2023, 3, 1), &[(&fixture.mailbox, Some(1))]);
    let middle = fixture.import("Failed", utc(2023, 2, 1), &[(&fixture.mailbox, Some(1))]);

    let ids: Vec<Uuid> = fixture
        .store
        .list_orders()
        .await
        .unwrap()
        .iter()
        .map(|summary| summary.header.id)
        .collect();
    assert_eq!(ids, vec![newest, middle, older]);
}

#[tokio::test]
async fn test_null_quantity_counts_as_zero() {
    let fixture = Fixture::new();
    let order_id = fixture.import(
        "Created",
        utc(2023, 1, 1),
        &[(&fixture.mailbox, None), (&fixture.mailbox, Some(2))],
    );

    let detail = fixture.store.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(detail.item_count, 2);
    assert_eq!(detail.items[0].quantity, 0);
    assert_eq!(detail.items[0].total_price, Decimal::ZERO);
    assert_eq!(detail.total_cost, dec("1.6"));
    assert_eq!(detail.total_price, dec("1.8"));
}

#[tokio::test]
async fn test_order_without_items_has_zero_totals() {
    let fixture = Fixture::new();
    let order_id = fixture.import("Created", utc(2023, 1, 1), &[]);

    let summary = fixture.store.list_orders().await.unwrap().remove(0);
    assert_eq!(summary.header.id, order_id);
    assert_eq!(summary.item_count, 0);
    assert_eq!(summary.total_cost, Decimal::ZERO);
    assert_eq!(summary.total_price, Decimal::ZERO);
}

// ============================================================================
// Point Lookup
// ============================================================================

#[tokio::test]
async fn test_get_order_with_item_names() {
    let fixture = Fixture::new();
    let order_id = fixture.import(
        "InProgress",
        utc(2023, 6, 15),
        &[(&fixture.archiving, Some(4)), (&fixture.mailbox, Some(1))],
    );

    let detail = fixture.store.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(detail.header.status_name, "InProgress");
    assert_eq!(detail.items.len(), 2);

    let first = &detail.items[0];
    assert_eq!(first.order_id, order_id);
    assert_eq!(first.product_name, "Archiving");
    assert_eq!(first.service_name, "Email");
    assert_eq!(first.total_cost, dec("2.0"));
    assert_eq!(first.total_price, dec("2.8"));
    assert_eq!(detail.items[1].product_name, "100GB Mailbox");
}

#[tokio::test]
async fn test_get_unknown_order_is_none() {
    let fixture = Fixture::new();
    assert!(fixture.store.get_order(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_totals_follow_catalog_prices() {
    let fixture = Fixture::new();
    let order_id = fixture.import("Created", utc(2023, 1, 1), &[(&fixture.mailbox, Some(10))]);

    fixture
        .store
        .reprice_product(fixture.mailbox.id, dec("1.0"), dec("1.5"))
        .unwrap();

    let detail = fixture.store.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(detail.total_cost, dec("10.0"));
    assert_eq!(detail.total_price, dec("15.0"));
}

// ============================================================================
// Status Filtering
// ============================================================================

#[tokio::test]
async fn test_filter_by_status_ignores_case() {
    let fixture = Fixture::new();
    let completed = fixture.import("Completed", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);
    fixture.import("Created", utc(2023, 1, 2), &[(&fixture.mailbox, Some(1))]);

    for name in ["Completed", "completed", "COMPLETED"] {
        let orders = fixture.store.list_orders_by_status(name).await.unwrap();
        assert_eq!(orders.len(), 1, "filter '{}'", name);
        assert_eq!(orders[0].header.id, completed);
    }
}

#[tokio::test]
async fn test_filter_by_unknown_status_is_empty() {
    let fixture = Fixture::new();
    fixture.import("Completed", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);

    let orders = fixture.store.list_orders_by_status("Shipped").await.unwrap();
    assert!(orders.is_empty());
}

// ============================================================================
// Status Updates
// ============================================================================

#[tokio::test]
async fn test_update_status_twice_succeeds() {
    let fixture = Fixture::new();
    let order_id = fixture.import("Created", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);

    let store = &fixture.store;
    let previous = store.update_status(order_id, "Completed", &AnyTransition).await.unwrap();
    assert_eq!(previous.name, "Created");
    let previous = store.update_status(order_id, "Completed", &AnyTransition).await.unwrap();
    assert_eq!(previous.name, "Completed");

    let status = fixture.store.current_status(order_id).await.unwrap().unwrap();
    assert_eq!(status.name, "Completed");
}

#[tokio::test]
async fn test_update_unknown_order_is_not_found() {
    let fixture = Fixture::new();
    let result = fixture
        .store
        .update_status(Uuid::new_v4(), "Completed", &AnyTransition)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_unknown_order_checked_before_unknown_status() {
    let fixture = Fixture::new();
    let result = fixture
        .store
        .update_status(Uuid::new_v4(), "Shipped", &AnyTransition)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_update_to_unknown_status_is_rejected() {
    let fixture = Fixture::new();
    let order_id = fixture.import("Created", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);

    let result = fixture
        .store
        .update_status(order_id, "Shipped", &AnyTransition)
        .await;
    assert!(matches!(result, Err(AppError::InvalidStatus(name)) if name == "Shipped"));

    let status = fixture.store.current_status(order_id).await.unwrap().unwrap();
    assert_eq!(status.name, "Created");
}

#[tokio::test]
async fn test_update_status_is_case_sensitive() {
    let fixture = Fixture::new();
    let order_id = fixture.import("Created", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);

    let result = fixture
        .store
        .update_status(order_id, "completed", &AnyTransition)
        .await;
    assert!(matches!(result, Err(AppError::InvalidStatus(_))));
}

#[tokio::test]
async fn test_refused_transition_leaves_status_unchanged() {
    let fixture = Fixture::new();
    let order_id = fixture.import("Completed", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);

    let result = fixture
        .store
        .update_status(order_id, "InProgress", &CompletedIsFinal)
        .await;
    assert!(matches!(
        result,
        Err(AppError::InvalidStateTransition { from, to }) if from == "Completed" && to == "InProgress"
    ));

    let status = fixture.store.current_status(order_id).await.unwrap().unwrap();
    assert_eq!(status.name, "Completed");
}

#[tokio::test]
async fn test_unknown_status_checked_before_policy() {
    let fixture = Fixture::new();
    let order_id = fixture.import("Completed", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);

    let result = fixture
        .store
        .update_status(order_id, "Shipped", &CompletedIsFinal)
        .await;
    assert!(matches!(result, Err(AppError::InvalidStatus(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_updates_never_reopen_completed_order() {
    let fixture = Fixture::new();
    let order_id = fixture.import("Created", utc(2023, 1, 1), &[(&fixture.mailbox, Some(1))]);

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let store = fixture.store.clone();
            let target = if i % 2 == 0 { "Completed" } else { "InProgress" };
            tokio::spawn(async move {
                let result = store.update_status(order_id, target, &CompletedIsFinal).await;
                (target, result)
            })
        })
        .collect();

    for task in tasks {
        match task.await.unwrap() {
            ("InProgress", Ok(previous)) => assert_ne!(previous.name, "Completed"),
            (_, Ok(_)) => {}
            ("InProgress", Err(AppError::InvalidStateTransition { from, .. })) => {
                assert_eq!(from, "Completed")
            }
            (target, Err(other)) => panic!("update to {} failed: {:?}", target, other),
        }
    }

    let status = fixture.store.current_status(order_id).await.unwrap().unwrap();
    assert_eq!(status.name, "Completed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_are_all_kept() {
    let fixture = Fixture::new();
    let store: Arc<InMemoryOrderStore> = fixture.store.clone();

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let store = store.clone();
            let draft = fixture.draft(&[(&fixture.mailbox, 1)]);
            tokio::spawn(async move { store.insert_order(&draft).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.list_orders().await.unwrap().len(), 32);
}

// ============================================================================
// Insertion
// ============================================================================

#[tokio::test]
async fn test_insert_round_trip() {
    let fixture = Fixture::new();
    let mut draft = fixture.draft(&[(&fixture.mailbox, 2), (&fixture.archiving, 5)]);
    // Caller-supplied dates and prices never reach the store
    draft.created_date = Some(utc(2001, 1, 1));
    draft.items[0].unit_price = Some(dec("99"));

    let before = Utc::now();
    let order_id = fixture.store.insert_order(&draft).await.unwrap();

    let detail = fixture.store.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(detail.header.status_name, "Created");
    assert_eq!(detail.header.reseller_id, draft.reseller_id);
    assert_eq!(detail.header.customer_id, draft.customer_id);
    assert!(detail.header.created_date >= before);
    assert!(detail.header.created_date <= Utc::now() + Duration::seconds(1));

    let quantities: Vec<i32> = detail.items.iter().map(|item| item.quantity).collect();
    assert_eq!(quantities, vec![2, 5]);
    assert_eq!(detail.item_count, 2);
    assert_eq!(detail.items[0].unit_price, dec("0.9"));
    // 2 x 0.8 + 5 x 0.5
    assert_eq!(detail.total_cost, dec("4.1"));
    // 2 x 0.9 + 5 x 0.7
    assert_eq!(detail.total_price, dec("5.3"));
}

#[tokio::test]
async fn test_insert_without_created_status_is_configuration_error() {
    let store = InMemoryOrderStore::new();
    store.register_status("Completed");
    let email = store.add_service("Email");
    let mailbox = store
        .add_product(email.id, "100GB Mailbox", dec("0.8"), dec("0.9"))
        .unwrap();

    let draft = shared::OrderDraft {
        reseller_id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        created_date: None,
        items: vec![shared::OrderItemDraft {
            product_id: mailbox.id,
            service_id: email.id,
            quantity: 1,
            unit_cost: None,
            unit_price: None,
        }],
    };

    let result = store.insert_order(&draft).await;
    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert!(store.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_created_status_lookup_is_exact() {
    let store = InMemoryOrderStore::new();
    store.register_status("created");

    assert!(store.find_status_exact("Created").await.unwrap().is_none());
    let found = store.find_status_case_insensitive("Created").await.unwrap().unwrap();
    assert_eq!(found.name, "created");
}

// ============================================================================
// Reference Data
// ============================================================================

#[tokio::test]
async fn test_list_statuses_ordered_by_name() {
    let fixture = Fixture::new();
    let names: Vec<String> = fixture
        .store
        .list_statuses()
        .await
        .unwrap()
        .into_iter()
        .map(|status| status.name)
        .collect();
    assert_eq!(names, vec!["Completed", "Created", "Failed", "InProgress"]);
}

#[tokio::test]
async fn test_register_status_is_idempotent() {
    let fixture = Fixture::new();
    let first = fixture.status_id("Completed");
    let second = fixture.status_id("Completed");
    assert_eq!(first, second);
    assert_eq!(fixture.store.list_statuses().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_inconsistent_product_rejected() {
    let fixture = Fixture::new();
    let result = fixture
        .store
        .add_product(fixture.email.id, "Loss Leader", dec("1.0"), dec("0.5"));
    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert!(fixture
        .store
        .reprice_product(fixture.mailbox.id, dec("-0.1"), dec("0.9"))
        .is_err());
}

#[tokio::test]
async fn test_import_with_unknown_status_rejected() {
    let fixture = Fixture::new();
    let order = StoredOrder {
        id: Uuid::new_v4(),
        reseller_id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        status_id: Uuid::new_v4(),
        created_date: utc(2023, 1, 1),
        items: Vec::new(),
    };
    assert!(matches!(
        fixture.store.import_order(order),
        Err(AppError::InvalidStatus(_))
    ));
}

#[tokio::test]
async fn test_find_product() {
    let fixture = Fixture::new();
    let product = fixture
        .store
        .find_product(fixture.archiving.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product, fixture.archiving);
    assert!(fixture.store.find_product(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_health_check() {
    let fixture = Fixture::new();
    assert!(fixture.store.health_check().await.is_ok());
}
