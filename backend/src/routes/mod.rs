//! Route definitions for the order management platform

use axum::{
    routing::{get, patch},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/orders", order_routes())
        .route("/statuses", get(handlers::list_statuses))
        .nest("/reports", report_routes())
}

/// Order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::add_order))
        .route("/status/:status", get(handlers::list_orders_by_status))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", patch(handlers::update_order_status))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new().route("/monthly-profits", get(handlers::get_monthly_profits))
}
