//! Shared fixtures for the backend integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use order_management::store::memory::{StoredItem, StoredOrder};
use order_management::store::InMemoryOrderStore;
use order_management::AppState;
use rust_decimal::Decimal;
use shared::{AnyTransition, OrderDraft, OrderItemDraft, Product, Service, TransitionPolicy};
use uuid::Uuid;

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Seeded store with an "Email" service selling a mailbox (0.8 / 0.9)
/// and an archiving add-on (0.5 / 0.7)
pub struct Fixture {
    pub store: Arc<InMemoryOrderStore>,
    pub email: Service,
    pub mailbox: Product,
    pub archiving: Product,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryOrderStore::seeded());
        let email = store.add_service("Email");
        let mailbox = store
            .add_product(email.id, "100GB Mailbox", dec("0.8"), dec("0.9"))
            .unwrap();
        let archiving = store
            .add_product(email.id, "Archiving", dec("0.5"), dec("0.7"))
            .unwrap();

        Self {
            store,
            email,
            mailbox,
            archiving,
        }
    }

    pub fn status_id(&self, name: &str) -> Uuid {
        self.store.register_status(name)
    }

    /// Import an order in the named status with one item per `(product, quantity)`
    pub fn import(
        &self,
        status: &str,
        created_date: DateTime<Utc>,
        lines: &[(&Product, Option<i32>)],
    ) -> Uuid {
        let order = StoredOrder {
            id: Uuid::new_v4(),
            reseller_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            status_id: self.status_id(status),
            created_date,
            items: lines
                .iter()
                .map(|(product, quantity)| StoredItem {
                    id: Uuid::new_v4(),
                    service_id: product.service_id,
                    product_id: product.id,
                    quantity: *quantity,
                })
                .collect(),
        };
        let order_id = order.id;
        self.store.import_order(order).unwrap();
        order_id
    }

    pub fn draft(&self, lines: &[(&Product, i32)]) -> OrderDraft {
        OrderDraft {
            reseller_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            created_date: None,
            items: lines
                .iter()
                .map(|(product, quantity)| OrderItemDraft {
                    product_id: product.id,
                    service_id: product.service_id,
                    quantity: *quantity,
                    unit_cost: None,
                    unit_price: None,
                })
                .collect(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state_with(Arc::new(AnyTransition))
    }

    pub fn state_with(&self, policy: Arc<dyn TransitionPolicy>) -> AppState {
        AppState::new(self.store.clone(), policy)
    }
}
