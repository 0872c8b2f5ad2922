//! Order aggregate: header, line items and the read projections built from them

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{PricedLine, Totals};

/// Order header fields shared by every projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub id: Uuid,
    pub reseller_id: Uuid,
    pub customer_id: Uuid,
    pub status_id: Uuid,
    pub status_name: String,
    pub created_date: DateTime<Utc>,
}

/// A stored line item joined with its catalog entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    /// Historical rows may carry no quantity
    pub quantity: Option<i32>,
    pub unit_cost: Decimal,
    pub unit_price: Decimal,
}

/// A line item as presented to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub unit_price: Decimal,
    pub total_cost: Decimal,
    pub total_price: Decimal,
}

impl OrderItem {
    pub fn line(&self) -> PricedLine {
        PricedLine::new(self.unit_cost, self.unit_price, self.quantity)
    }
}

impl From<ItemRecord> for OrderItem {
    fn from(record: ItemRecord) -> Self {
        let line = PricedLine::new(
            record.unit_cost,
            record.unit_price,
            record.quantity.unwrap_or(0),
        );

        Self {
            id: record.id,
            order_id: record.order_id,
            service_id: record.service_id,
            service_name: record.service_name,
            product_id: record.product_id,
            product_name: record.product_name,
            quantity: line.quantity,
            unit_cost: line.unit_cost,
            unit_price: line.unit_price,
            total_cost: line.total_cost(),
            total_price: line.total_price(),
        }
    }
}

/// Order listing row; totals are recomputed on every query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub header: OrderHeader,
    pub item_count: i64,
    pub total_cost: Decimal,
    pub total_price: Decimal,
}

impl OrderSummary {
    pub fn new(header: OrderHeader, item_count: i64, totals: Totals) -> Self {
        Self {
            header,
            item_count,
            total_cost: totals.total_cost,
            total_price: totals.total_price,
        }
    }
}

/// Single order with its full item list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: OrderHeader,
    pub item_count: i64,
    pub total_cost: Decimal,
    pub total_price: Decimal,
    pub items: Vec<OrderItem>,
}

impl OrderDetail {
    /// Assemble a detail projection, deriving totals from the items
    pub fn new(header: OrderHeader, items: Vec<OrderItem>) -> Self {
        let totals = Totals::of(items.iter().map(OrderItem::line));
        Self {
            header,
            item_count: items.len() as i64,
            total_cost: totals.total_cost,
            total_price: totals.total_price,
            items,
        }
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            header: self.header.clone(),
            item_count: self.item_count,
            total_cost: self.total_cost,
            total_price: self.total_price,
        }
    }
}

/// Order creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub reseller_id: Uuid,
    pub customer_id: Uuid,
    /// Checked against the clock, then replaced by the insertion time
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItemDraft>,
}

/// Line item of an order creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDraft {
    pub product_id: Uuid,
    pub service_id: Uuid,
    /// A missing quantity reads as 0 and is then rejected by validation
    #[serde(default)]
    pub quantity: i32,
    /// Informational only; catalog values are what gets priced
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}
