//! HTTP handlers for order endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use shared::{OrderDetail, OrderDraft, OrderSummary};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct CreatedOrderResponse {
    pub order_id: Uuid,
}

/// List all orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<OrderSummary>>> {
    let orders = state.order_service().list_orders().await?;
    Ok(Json(orders))
}

/// Get order by ID
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let order = state.order_service().get_order(order_id).await?;
    Ok(Json(order))
}

/// List orders in a status (case-insensitive)
pub async fn list_orders_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<OrderSummary>>> {
    let orders = state.order_service().list_orders_by_status(&status).await?;
    Ok(Json(orders))
}

/// Change the status of an order; the body is the bare status name as a JSON string
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(status): Json<String>,
) -> AppResult<Json<MessageResponse>> {
    state
        .order_service()
        .update_status(order_id, &status)
        .await?;

    Ok(Json(MessageResponse {
        message: format!("Order status updated to '{}'.", status),
    }))
}

/// Create a new order
pub async fn add_order(
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> AppResult<impl IntoResponse> {
    let order_id = state.order_service().add_order(draft).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/orders/{}", order_id))],
        Json(CreatedOrderResponse { order_id }),
    ))
}
