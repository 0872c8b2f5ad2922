//! Order management platform: order store, order rules and profit reporting
//! served over HTTP

use std::sync::Arc;

use axum::{routing::get, Router};
use shared::TransitionPolicy;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::OrderService;
use store::OrderStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub transition_policy: Arc<dyn TransitionPolicy>,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, transition_policy: Arc<dyn TransitionPolicy>) -> Self {
        Self {
            store,
            transition_policy,
        }
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.store.clone(), self.transition_policy.clone())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Order Management API v1.0"
}
