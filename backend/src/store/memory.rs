//! In-process order store
//!
//! Holds the same tables as the relational schema behind a single lock; every
//! write happens under one write guard, so it is atomic for readers.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::{
    aggregate_monthly_profits, status_names_match, CompletedOrder, ItemRecord, MonthlyProfit,
    OrderDetail, OrderDraft, OrderHeader, OrderItem, OrderStatus, OrderSummary, Product,
    ProfitItem, Service, StatusRegistry, TransitionPolicy, WellKnownStatus,
};
use uuid::Uuid;

use super::OrderStore;
use crate::error::{AppError, AppResult};

/// An order row with its owned item rows
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: Uuid,
    pub reseller_id: Uuid,
    pub customer_id: Uuid,
    pub status_id: Uuid,
    pub created_date: DateTime<Utc>,
    pub items: Vec<StoredItem>,
}

/// An item row; prices live in the catalog, not here
#[derive(Debug, Clone)]
pub struct StoredItem {
    pub id: Uuid,
    pub service_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Option<i32>,
}

#[derive(Debug, Default)]
struct Tables {
    statuses: StatusRegistry,
    services: HashMap<Uuid, Service>,
    products: HashMap<Uuid, Product>,
    orders: Vec<StoredOrder>,
}

impl Tables {
    fn detail(&self, order: &StoredOrder) -> AppResult<OrderDetail> {
        let status = self.statuses.by_id(order.status_id).ok_or_else(|| {
            AppError::Internal(format!("Order {} references unknown status", order.id))
        })?;

        let items = order
            .items
            .iter()
            .map(|item| self.item(order.id, item))
            .collect::<AppResult<Vec<_>>>()?;

        let header = OrderHeader {
            id: order.id,
            reseller_id: order.reseller_id,
            customer_id: order.customer_id,
            status_id: status.id,
            status_name: status.name.clone(),
            created_date: order.created_date,
        };

        Ok(OrderDetail::new(header, items))
    }

    fn item(&self, order_id: Uuid, item: &StoredItem) -> AppResult<OrderItem> {
        let product = self.product(item.product_id)?;
        let service = self.services.get(&item.service_id).ok_or_else(|| {
            AppError::Internal(format!("Item {} references unknown service", item.id))
        })?;

        Ok(OrderItem::from(ItemRecord {
            id: item.id,
            order_id,
            service_id: service.id,
            service_name: service.name.clone(),
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            unit_cost: product.unit_cost,
            unit_price: product.unit_price,
        }))
    }

    fn product(&self, product_id: Uuid) -> AppResult<&Product> {
        self.products.get(&product_id).ok_or_else(|| {
            AppError::Internal(format!("Product {} missing from catalog", product_id))
        })
    }

    /// Summaries of the matching orders, newest first
    fn summaries<F>(&self, keep: F) -> AppResult<Vec<OrderSummary>>
    where
        F: Fn(&OrderStatus) -> bool,
    {
        let mut summaries = Vec::new();
        for order in &self.orders {
            let detail = self.detail(order)?;
            let status = OrderStatus {
                id: detail.header.status_id,
                name: detail.header.status_name.clone(),
            };
            if keep(&status) {
                summaries.push(detail.summary());
            }
        }
        summaries.sort_by(|a, b| b.header.created_date.cmp(&a.header.created_date));
        Ok(summaries)
    }
}

/// Order store kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    tables: RwLock<Tables>,
}

impl InMemoryOrderStore {
    /// Empty store without any registered status
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the well-known statuses registered
    pub fn seeded() -> Self {
        Self {
            tables: RwLock::new(Tables {
                statuses: StatusRegistry::seeded(),
                ..Tables::default()
            }),
        }
    }

    /// Seeded store with a small email catalog for local runs
    pub fn demo() -> AppResult<Self> {
        let store = Self::seeded();
        let email = store.add_service("Email");
        store.add_product(email.id, "100GB Mailbox", Decimal::new(8, 1), Decimal::new(9, 1))?;
        store.add_product(email.id, "Archiving", Decimal::new(5, 1), Decimal::new(7, 1))?;
        let antivirus = store.add_service("Antivirus");
        store.add_product(antivirus.id, "Endpoint Seat", Decimal::new(12, 1), Decimal::new(15, 1))?;
        Ok(store)
    }

    /// Register a status name; an exact duplicate returns the existing id
    pub fn register_status(&self, name: &str) -> Uuid {
        self.tables.write().statuses.register(name)
    }

    pub fn add_service(&self, name: &str) -> Service {
        let service = Service {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.tables.write().services.insert(service.id, service.clone());
        service
    }

    pub fn add_product(
        &self,
        service_id: Uuid,
        name: &str,
        unit_cost: Decimal,
        unit_price: Decimal,
    ) -> AppResult<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            service_id,
            name: name.to_string(),
            unit_cost,
            unit_price,
        };
        if !product.is_consistent() {
            return Err(AppError::Validation {
                field: "unit_price".to_string(),
                message: "Unit price must be at least the unit cost, and neither negative"
                    .to_string(),
            });
        }

        let mut tables = self.tables.write();
        if !tables.services.contains_key(&service_id) {
            return Err(AppError::NotFound(format!("Service '{}'", service_id)));
        }
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Change catalog prices; existing orders pick them up on their next read
    pub fn reprice_product(
        &self,
        product_id: Uuid,
        unit_cost: Decimal,
        unit_price: Decimal,
    ) -> AppResult<Product> {
        let mut tables = self.tables.write();
        let product = tables
            .products
            .get_mut(&product_id)
            .ok_or_else(|| AppError::NotFound(format!("Product '{}'", product_id)))?;

        let repriced = Product {
            unit_cost,
            unit_price,
            ..product.clone()
        };
        if !repriced.is_consistent() {
            return Err(AppError::Validation {
                field: "unit_price".to_string(),
                message: "Unit price must be at least the unit cost, and neither negative"
                    .to_string(),
            });
        }
        *product = repriced.clone();
        Ok(repriced)
    }

    /// Load an order as-is, with its own creation date and status.
    ///
    /// Used to bring over historical orders; new orders go through `insert_order`.
    pub fn import_order(&self, order: StoredOrder) -> AppResult<()> {
        let mut tables = self.tables.write();

        if tables.statuses.by_id(order.status_id).is_none() {
            return Err(AppError::InvalidStatus(order.status_id.to_string()));
        }
        for item in &order.items {
            tables.product(item.product_id)?;
        }
        if tables.orders.iter().any(|existing| existing.id == order.id) {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: format!("Order {} already exists", order.id),
            });
        }

        tables.orders.push(order);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn list_orders(&self) -> AppResult<Vec<OrderSummary>> {
        self.tables.read().summaries(|_| true)
    }

    async fn get_order(&self, order_id: Uuid) -> AppResult<Option<OrderDetail>> {
        let tables = self.tables.read();
        tables
            .orders
            .iter()
            .find(|order| order.id == order_id)
            .map(|order| tables.detail(order))
            .transpose()
    }

    async fn list_orders_by_status(&self, status_name: &str) -> AppResult<Vec<OrderSummary>> {
        self.tables
            .read()
            .summaries(|status| status_names_match(&status.name, status_name))
    }

    async fn update_status(
        &self,
        order_id: Uuid,
        new_status: &str,
        policy: &dyn TransitionPolicy,
    ) -> AppResult<OrderStatus> {
        let mut tables = self.tables.write();

        let index = tables
            .orders
            .iter()
            .position(|order| order.id == order_id)
            .ok_or_else(|| AppError::NotFound(format!("Order '{}'", order_id)))?;

        let current = tables
            .statuses
            .by_id(tables.orders[index].status_id)
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(format!("Order {} references unknown status", order_id))
            })?;

        let target = tables
            .statuses
            .find_status_exact(new_status)
            .cloned()
            .ok_or_else(|| AppError::InvalidStatus(new_status.to_string()))?;

        if !policy.allows(&current, &target) {
            return Err(AppError::InvalidStateTransition {
                from: current.name,
                to: target.name,
            });
        }

        tables.orders[index].status_id = target.id;
        Ok(current)
    }

    async fn insert_order(&self, draft: &OrderDraft) -> AppResult<Uuid> {
        let mut tables = self.tables.write();

        let created = tables
            .statuses
            .find_status_exact(WellKnownStatus::Created.as_str())
            .ok_or_else(|| AppError::Configuration("Default status 'Created' not found".to_string()))?
            .id;

        for item in &draft.items {
            tables.product(item.product_id)?;
            if !tables.services.contains_key(&item.service_id) {
                return Err(AppError::Internal(format!(
                    "Service {} missing from catalog",
                    item.service_id
                )));
            }
        }

        let order = StoredOrder {
            id: Uuid::new_v4(),
            reseller_id: draft.reseller_id,
            customer_id: draft.customer_id,
            status_id: created,
            created_date: Utc::now(),
            items: draft
                .items
                .iter()
                .map(|item| StoredItem {
                    id: Uuid::new_v4(),
                    service_id: item.service_id,
                    product_id: item.product_id,
                    quantity: Some(item.quantity),
                })
                .collect(),
        };

        let order_id = order.id;
        tables.orders.push(order);
        Ok(order_id)
    }

    async fn monthly_profits(&self) -> AppResult<Vec<MonthlyProfit>> {
        let tables = self.tables.read();

        let mut completed = Vec::new();
        for order in &tables.orders {
            let is_completed = tables
                .statuses
                .by_id(order.status_id)
                .is_some_and(|status| WellKnownStatus::Completed.matches(status));
            if !is_completed {
                continue;
            }

            let items = order
                .items
                .iter()
                .map(|item| {
                    let product = tables.product(item.product_id)?;
                    Ok(ProfitItem {
                        unit_cost: product.unit_cost,
                        unit_price: product.unit_price,
                        quantity: item.quantity,
                    })
                })
                .collect::<AppResult<Vec<_>>>()?;

            completed.push(CompletedOrder {
                created_date: order.created_date,
                items,
            });
        }

        Ok(aggregate_monthly_profits(completed))
    }

    async fn list_statuses(&self) -> AppResult<Vec<OrderStatus>> {
        let mut statuses = self.tables.read().statuses.all().to_vec();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(statuses)
    }

    async fn find_status_exact(&self, name: &str) -> AppResult<Option<OrderStatus>> {
        Ok(self.tables.read().statuses.find_status_exact(name).cloned())
    }

    async fn find_status_case_insensitive(&self, name: &str) -> AppResult<Option<OrderStatus>> {
        Ok(self.tables.read().statuses.find_status_case_insensitive(name).cloned())
    }

    async fn current_status(&self, order_id: Uuid) -> AppResult<Option<OrderStatus>> {
        let tables = self.tables.read();
        Ok(tables
            .orders
            .iter()
            .find(|order| order.id == order_id)
            .and_then(|order| tables.statuses.by_id(order.status_id))
            .cloned())
    }

    async fn find_product(&self, product_id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.tables.read().products.get(&product_id).cloned())
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}
