//! Validation rules for order creation requests
//!
//! Every rule runs; callers get the full list of violations rather than the first one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{OrderDraft, OrderItemDraft, Product};

/// A single reason an order draft was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderViolation {
    #[error("Order must contain at least one item")]
    EmptyItems,

    #[error("Item {index}: quantity must be at least 1 (got {quantity})")]
    InvalidQuantity { index: usize, quantity: i32 },

    #[error("Created date {created_date} is in the future")]
    FutureDate { created_date: DateTime<Utc> },

    #[error("{field} cannot be negative (got {value})")]
    NegativeAmount { field: String, value: Decimal },

    #[error("Item {index}: product {product_id} is not in the catalog")]
    UnknownProduct { index: usize, product_id: Uuid },

    #[error("Item {index}: product {product_id} is not sold under service {service_id}")]
    ServiceMismatch {
        index: usize,
        product_id: Uuid,
        service_id: Uuid,
    },
}

impl OrderViolation {
    pub fn code(&self) -> &'static str {
        match self {
            OrderViolation::EmptyItems => "EMPTY_ITEMS",
            OrderViolation::InvalidQuantity { .. } => "INVALID_QUANTITY",
            OrderViolation::FutureDate { .. } => "FUTURE_DATE",
            OrderViolation::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            OrderViolation::UnknownProduct { .. } => "UNKNOWN_PRODUCT",
            OrderViolation::ServiceMismatch { .. } => "SERVICE_MISMATCH",
        }
    }

    /// Path of the offending request field
    pub fn field(&self) -> String {
        match self {
            OrderViolation::EmptyItems => "items".to_string(),
            OrderViolation::InvalidQuantity { index, .. } => format!("items[{}].quantity", index),
            OrderViolation::FutureDate { .. } => "created_date".to_string(),
            OrderViolation::NegativeAmount { field, .. } => field.clone(),
            OrderViolation::UnknownProduct { index, .. } => format!("items[{}].product_id", index),
            OrderViolation::ServiceMismatch { index, .. } => format!("items[{}].service_id", index),
        }
    }

    pub fn detail(&self) -> ViolationDetail {
        ViolationDetail {
            code: self.code().to_string(),
            field: self.field(),
            message: self.to_string(),
        }
    }
}

/// Serializable form of a violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationDetail {
    pub code: String,
    pub field: String,
    pub message: String,
}

// ============================================================================
// Draft Shape Validations
// ============================================================================

/// Validate the shape of an order draft against the given clock.
///
/// Catalog membership is not checked here; see [`validate_catalog_item`].
pub fn validate_order_draft(draft: &OrderDraft, now: DateTime<Utc>) -> Result<(), Vec<OrderViolation>> {
    let mut violations = Vec::new();

    if draft.items.is_empty() {
        violations.push(OrderViolation::EmptyItems);
    }

    if let Some(created_date) = draft.created_date {
        if created_date > now {
            violations.push(OrderViolation::FutureDate { created_date });
        }
    }

    for (index, item) in draft.items.iter().enumerate() {
        violations.extend(validate_item(index, item));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate a single draft line
pub fn validate_item(index: usize, item: &OrderItemDraft) -> Vec<OrderViolation> {
    let mut violations = Vec::new();

    if item.quantity < 1 {
        violations.push(OrderViolation::InvalidQuantity {
            index,
            quantity: item.quantity,
        });
    }

    let amounts = [("unit_cost", item.unit_cost), ("unit_price", item.unit_price)];
    for (name, amount) in amounts {
        if let Some(value) = amount {
            if value < Decimal::ZERO {
                violations.push(OrderViolation::NegativeAmount {
                    field: format!("items[{}].{}", index, name),
                    value,
                });
            }
        }
    }

    violations
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Check a draft line against its catalog entry (`None` when the product is unknown)
pub fn validate_catalog_item(
    index: usize,
    item: &OrderItemDraft,
    product: Option<&Product>,
) -> Option<OrderViolation> {
    match product {
        None => Some(OrderViolation::UnknownProduct {
            index,
            product_id: item.product_id,
        }),
        Some(product) if product.service_id != item.service_id => {
            Some(OrderViolation::ServiceMismatch {
                index,
                product_id: item.product_id,
                service_id: item.service_id,
            })
        }
        Some(_) => None,
    }
}
