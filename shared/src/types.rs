//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit economics of one order line, resolved from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub unit_cost: Decimal,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl PricedLine {
    pub fn new(unit_cost: Decimal, unit_price: Decimal, quantity: i32) -> Self {
        Self {
            unit_cost,
            unit_price,
            quantity,
        }
    }

    /// unit_cost × quantity
    pub fn total_cost(&self) -> Decimal {
        self.unit_cost * Decimal::from(self.quantity)
    }

    /// unit_price × quantity
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// (unit_price − unit_cost) × quantity
    pub fn profit(&self) -> Decimal {
        (self.unit_price - self.unit_cost) * Decimal::from(self.quantity)
    }
}

/// Cost and price totals over a set of order lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub total_cost: Decimal,
    pub total_price: Decimal,
}

impl Totals {
    /// Sum cost and price over the given lines
    pub fn of<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = PricedLine>,
    {
        lines.into_iter().fold(Self::default(), |mut acc, line| {
            acc.add(&line);
            acc
        })
    }

    pub fn add(&mut self, line: &PricedLine) {
        self.total_cost += line.total_cost();
        self.total_price += line.total_price();
    }

    pub fn margin(&self) -> Decimal {
        self.total_price - self.total_cost
    }
}
