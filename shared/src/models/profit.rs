//! Monthly profit aggregation over completed orders

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::PricedLine;

/// Profit of all completed orders created in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyProfit {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub total_profit: Decimal,
}

/// Line economics of an item in a completed order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitItem {
    pub unit_cost: Decimal,
    pub unit_price: Decimal,
    pub quantity: Option<i32>,
}

impl ProfitItem {
    pub fn profit(&self) -> Decimal {
        PricedLine::new(self.unit_cost, self.unit_price, self.quantity.unwrap_or(0)).profit()
    }
}

/// A completed order as seen by the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedOrder {
    pub created_date: DateTime<Utc>,
    pub items: Vec<ProfitItem>,
}

/// Group completed orders by (year, month) of their creation date, newest month first.
///
/// Every month holding at least one order yields a row, even if its profit
/// sums to zero; months without orders yield nothing.
pub fn aggregate_monthly_profits<I>(orders: I) -> Vec<MonthlyProfit>
where
    I: IntoIterator<Item = CompletedOrder>,
{
    let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();

    for order in orders {
        let key = (order.created_date.year(), order.created_date.month());
        let order_profit: Decimal = order.items.iter().map(ProfitItem::profit).sum();
        *by_month.entry(key).or_insert(Decimal::ZERO) += order_profit;
    }

    by_month
        .into_iter()
        .rev()
        .map(|((year, month), total_profit)| MonthlyProfit {
            year,
            month,
            total_profit,
        })
        .collect()
}
