//! WebAssembly module for the order management platform
//!
//! Provides client-side computation for:
//! - Order draft validation before submission
//! - Order totals from priced lines
//! - Per-line profit

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Validate an order draft; returns a JSON array of violations, empty when valid
#[wasm_bindgen]
pub fn validate_order_draft(draft_json: &str) -> Result<String, JsValue> {
    let now = DateTime::from_timestamp_millis(js_sys::Date::now() as i64)
        .ok_or_else(|| JsValue::from_str("Browser clock out of range"))?;

    let violations = draft_violations(draft_json, now).map_err(|e| JsValue::from_str(&e))?;
    serde_json::to_string(&violations).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Sum cost and price over a JSON array of priced lines
#[wasm_bindgen]
pub fn calculate_order_totals(lines_json: &str) -> Result<String, JsValue> {
    let totals = order_totals(lines_json).map_err(|e| JsValue::from_str(&e))?;
    serde_json::to_string(&totals).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Profit of one line; amounts are decimal strings to keep them exact
#[wasm_bindgen]
pub fn calculate_line_profit(
    unit_cost: &str,
    unit_price: &str,
    quantity: i32,
) -> Result<String, JsValue> {
    line_profit(unit_cost, unit_price, quantity)
        .map(|profit| profit.to_string())
        .map_err(|e| JsValue::from_str(&e))
}

fn draft_violations(draft_json: &str, now: DateTime<Utc>) -> Result<Vec<ViolationDetail>, String> {
    let draft: OrderDraft =
        serde_json::from_str(draft_json).map_err(|e| format!("Invalid draft JSON: {}", e))?;

    Ok(shared::validate_order_draft(&draft, now)
        .err()
        .unwrap_or_default()
        .iter()
        .map(OrderViolation::detail)
        .collect())
}

fn order_totals(lines_json: &str) -> Result<Totals, String> {
    let lines: Vec<PricedLine> =
        serde_json::from_str(lines_json).map_err(|e| format!("Invalid lines JSON: {}", e))?;
    Ok(Totals::of(lines))
}

fn line_profit(unit_cost: &str, unit_price: &str, quantity: i32) -> Result<Decimal, String> {
    let unit_cost =
        Decimal::from_str(unit_cost).map_err(|e| format!("Invalid unit cost: {}", e))?;
    let unit_price =
        Decimal::from_str(unit_price).map_err(|e| format!("Invalid unit price: {}", e))?;
    Ok(PricedLine::new(unit_cost, unit_price, quantity).profit())
}
