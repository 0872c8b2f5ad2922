//! Order store: persistence contract for orders, their items and the
//! reference data (status registry, catalog) they point at

use async_trait::async_trait;
use shared::{
    MonthlyProfit, OrderDetail, OrderDraft, OrderStatus, OrderSummary, Product, TransitionPolicy,
};
use uuid::Uuid;

use crate::error::AppResult;

pub mod ids;
pub mod memory;
pub mod postgres;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

/// Persistence operations for orders.
///
/// Writes (`update_status`, `insert_order`) are atomic: callers never observe
/// a half-applied change. Listings are ordered newest first.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders with totals computed from current catalog prices
    async fn list_orders(&self) -> AppResult<Vec<OrderSummary>>;

    /// Single order with items; `None` when no order has this id
    async fn get_order(&self, order_id: Uuid) -> AppResult<Option<OrderDetail>>;

    /// Orders whose status name matches case-insensitively; unknown names yield nothing
    async fn list_orders_by_status(&self, status_name: &str) -> AppResult<Vec<OrderSummary>>;

    /// Point the order at the status named exactly `new_status` and return
    /// the status it held before.
    ///
    /// Fails with `NotFound` for an unknown order (checked first), then
    /// `InvalidStatus` for an unknown status name, then
    /// `InvalidStateTransition` when `policy` refuses the move. The order is
    /// held for the whole check, so a concurrent update cannot slip between
    /// the policy decision and the write.
    async fn update_status(
        &self,
        order_id: Uuid,
        new_status: &str,
        policy: &dyn TransitionPolicy,
    ) -> AppResult<OrderStatus>;

    /// Persist a new order with status "Created" and the current time as its
    /// creation date; returns the generated id
    async fn insert_order(&self, draft: &OrderDraft) -> AppResult<Uuid>;

    /// Profit of Completed orders grouped by calendar month, newest first
    async fn monthly_profits(&self) -> AppResult<Vec<MonthlyProfit>>;

    async fn list_statuses(&self) -> AppResult<Vec<OrderStatus>>;

    async fn find_status_exact(&self, name: &str) -> AppResult<Option<OrderStatus>>;

    async fn find_status_case_insensitive(&self, name: &str) -> AppResult<Option<OrderStatus>>;

    /// Status an order currently holds; `None` when the order does not exist
    async fn current_status(&self, order_id: Uuid) -> AppResult<Option<OrderStatus>>;

    async fn find_product(&self, product_id: Uuid) -> AppResult<Option<Product>>;

    async fn health_check(&self) -> AppResult<()>;
}
