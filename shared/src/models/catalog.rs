//! Catalog reference data (services and the products sold under them)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A service category, e.g. "Email"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
}

/// A product resold within a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub unit_cost: Decimal,
    pub unit_price: Decimal,
}

impl Product {
    /// Catalog invariant: unit_price >= unit_cost >= 0
    pub fn is_consistent(&self) -> bool {
        self.unit_cost >= Decimal::ZERO && self.unit_price >= self.unit_cost
    }
}
