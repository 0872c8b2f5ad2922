//! Reporting service for profit analytics and data export

use std::sync::Arc;

use serde::Serialize;
use shared::MonthlyProfit;

use crate::error::{AppError, AppResult};
use crate::store::OrderStore;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn OrderStore>,
}

impl ReportingService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Profit of Completed orders per calendar month, newest month first
    pub async fn monthly_profits(&self) -> AppResult<Vec<MonthlyProfit>> {
        let profits = self.store.monthly_profits().await?;
        tracing::debug!(months = profits.len(), "Monthly profits computed");
        Ok(profits)
    }

    /// Export report data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
