//! Status registry handlers

use axum::{extract::State, Json};
use shared::OrderStatus;

use crate::error::AppResult;
use crate::AppState;

/// List the registered order statuses
pub async fn list_statuses(State(state): State<AppState>) -> AppResult<Json<Vec<OrderStatus>>> {
    let statuses = state.order_service().list_statuses().await?;
    Ok(Json(statuses))
}
