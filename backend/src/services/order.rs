//! Order service: creation validation, status changes and order queries

use std::sync::Arc;

use chrono::Utc;
use shared::{
    validate_catalog_item, validate_order_draft, OrderDetail, OrderDraft, OrderStatus,
    OrderSummary, TransitionPolicy,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::OrderStore;

/// Order service sitting between the HTTP handlers and the order store
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    policy: Arc<dyn TransitionPolicy>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, policy: Arc<dyn TransitionPolicy>) -> Self {
        Self { store, policy }
    }

    /// List all orders, newest first
    pub async fn list_orders(&self) -> AppResult<Vec<OrderSummary>> {
        self.store.list_orders().await
    }

    /// Get a single order with its items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderDetail> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order '{}'", order_id)))
    }

    /// List orders whose status matches `status_name`, ignoring case
    pub async fn list_orders_by_status(&self, status_name: &str) -> AppResult<Vec<OrderSummary>> {
        self.store.list_orders_by_status(status_name).await
    }

    /// Move an order to the status named exactly `new_status`
    pub async fn update_status(&self, order_id: Uuid, new_status: &str) -> AppResult<()> {
        let previous = self
            .store
            .update_status(order_id, new_status, self.policy.as_ref())
            .await?;

        tracing::info!(
            order_id = %order_id,
            from = %previous.name,
            status = %new_status,
            "Order status updated"
        );

        Ok(())
    }

    /// Validate a draft against the shape rules and the catalog, then persist it
    pub async fn add_order(&self, draft: OrderDraft) -> AppResult<Uuid> {
        let mut violations = validate_order_draft(&draft, Utc::now()).err().unwrap_or_default();

        for (index, item) in draft.items.iter().enumerate() {
            let product = self.store.find_product(item.product_id).await?;
            violations.extend(validate_catalog_item(index, item, product.as_ref()));
        }

        if !violations.is_empty() {
            tracing::warn!(
                reseller_id = %draft.reseller_id,
                violations = violations.len(),
                "Order draft rejected"
            );
            return Err(AppError::InvalidOrder(violations));
        }

        let order_id = self.store.insert_order(&draft).await?;

        tracing::info!(
            order_id = %order_id,
            items = draft.items.len(),
            "Order created"
        );

        Ok(order_id)
    }

    /// All registered statuses, ordered by name
    pub async fn list_statuses(&self) -> AppResult<Vec<OrderStatus>> {
        self.store.list_statuses().await
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }
}
