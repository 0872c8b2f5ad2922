//! HTTP request handlers

pub mod health;
pub mod order;
pub mod reporting;
pub mod status;

pub use health::health_check;
pub use order::{add_order, get_order, list_orders, list_orders_by_status, update_order_status};
pub use reporting::get_monthly_profits;
pub use status::list_statuses;
