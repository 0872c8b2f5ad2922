//! PostgreSQL order store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    ItemRecord, MonthlyProfit, OrderDetail, OrderDraft, OrderHeader, OrderItem, OrderStatus,
    OrderSummary, Product, Totals, TransitionPolicy, WellKnownStatus,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{ids, OrderStore};
use crate::error::{AppError, AppResult};

/// Order store backed by the relational schema in `migrations/`
#[derive(Clone)]
pub struct PgOrderStore {
    db: PgPool,
}

/// Summary projection; totals are summed over the live catalog prices
const SUMMARY_SELECT: &str = r#"
    SELECT o.id, o.reseller_id, o.customer_id, o.status_id, s.name AS status_name, o.created_date,
           COUNT(i.id) AS item_count,
           COALESCE(SUM(i.quantity * p.unit_cost), 0) AS total_cost,
           COALESCE(SUM(i.quantity * p.unit_price), 0) AS total_price
    FROM orders o
    JOIN order_status s ON s.id = o.status_id
    LEFT JOIN order_item i ON i.order_id = o.id
    LEFT JOIN order_product p ON p.id = i.product_id
"#;

const SUMMARY_GROUP_ORDER: &str = r#"
    GROUP BY o.id, s.name
    ORDER BY o.created_date DESC
"#;

/// Row for summary queries
#[derive(Debug, FromRow)]
struct SummaryRow {
    id: Vec<u8>,
    reseller_id: Vec<u8>,
    customer_id: Vec<u8>,
    status_id: Vec<u8>,
    status_name: String,
    created_date: DateTime<Utc>,
    item_count: i64,
    total_cost: Decimal,
    total_price: Decimal,
}

impl SummaryRow {
    fn into_summary(self) -> AppResult<OrderSummary> {
        let header = OrderHeader {
            id: ids::from_bytes(&self.id)?,
            reseller_id: ids::from_bytes(&self.reseller_id)?,
            customer_id: ids::from_bytes(&self.customer_id)?,
            status_id: ids::from_bytes(&self.status_id)?,
            status_name: self.status_name,
            created_date: self.created_date,
        };
        let totals = Totals {
            total_cost: self.total_cost,
            total_price: self.total_price,
        };
        Ok(OrderSummary::new(header, self.item_count, totals))
    }
}

/// Row for the order header lookup
#[derive(Debug, FromRow)]
struct HeaderRow {
    id: Vec<u8>,
    reseller_id: Vec<u8>,
    customer_id: Vec<u8>,
    status_id: Vec<u8>,
    status_name: String,
    created_date: DateTime<Utc>,
}

/// Row for item queries, joined with the catalog
#[derive(Debug, FromRow)]
struct ItemRow {
    id: Vec<u8>,
    order_id: Vec<u8>,
    service_id: Vec<u8>,
    service_name: String,
    product_id: Vec<u8>,
    product_name: String,
    quantity: Option<i32>,
    unit_cost: Decimal,
    unit_price: Decimal,
}

impl ItemRow {
    fn into_item(self) -> AppResult<OrderItem> {
        Ok(OrderItem::from(ItemRecord {
            id: ids::from_bytes(&self.id)?,
            order_id: ids::from_bytes(&self.order_id)?,
            service_id: ids::from_bytes(&self.service_id)?,
            service_name: self.service_name,
            product_id: ids::from_bytes(&self.product_id)?,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            unit_price: self.unit_price,
        }))
    }
}

#[derive(Debug, FromRow)]
struct StatusRow {
    id: Vec<u8>,
    name: String,
}

impl StatusRow {
    fn into_status(self) -> AppResult<OrderStatus> {
        Ok(OrderStatus {
            id: ids::from_bytes(&self.id)?,
            name: self.name,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Vec<u8>,
    service_id: Vec<u8>,
    name: String,
    unit_cost: Decimal,
    unit_price: Decimal,
}

#[derive(Debug, FromRow)]
struct ProfitRow {
    year: i32,
    month: i32,
    total_profit: Decimal,
}

impl PgOrderStore {
    /// Create a new PgOrderStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_summaries(&self, filter: Option<&str>) -> AppResult<Vec<OrderSummary>> {
        let rows = match filter {
            Some(status_name) => {
                let sql = format!(
                    "{} WHERE LOWER(s.name) = LOWER($1) {}",
                    SUMMARY_SELECT, SUMMARY_GROUP_ORDER
                );
                sqlx::query_as::<_, SummaryRow>(&sql)
                    .bind(status_name)
                    .fetch_all(&self.db)
                    .await?
            }
            None => {
                let sql = format!("{} {}", SUMMARY_SELECT, SUMMARY_GROUP_ORDER);
                sqlx::query_as::<_, SummaryRow>(&sql)
                    .fetch_all(&self.db)
                    .await?
            }
        };

        rows.into_iter().map(SummaryRow::into_summary).collect()
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list_orders(&self) -> AppResult<Vec<OrderSummary>> {
        self.fetch_summaries(None).await
    }

    async fn get_order(&self, order_id: Uuid) -> AppResult<Option<OrderDetail>> {
        let order_id_bytes = ids::to_bytes(order_id);

        let Some(header) = sqlx::query_as::<_, HeaderRow>(
            r#"
            SELECT o.id, o.reseller_id, o.customer_id, o.status_id, s.name AS status_name, o.created_date
            FROM orders o
            JOIN order_status s ON s.id = o.status_id
            WHERE o.id = $1
            "#,
        )
        .bind(&order_id_bytes)
        .fetch_optional(&self.db)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT i.id, i.order_id, i.service_id, sv.name AS service_name,
                   i.product_id, p.name AS product_name, i.quantity, p.unit_cost, p.unit_price
            FROM order_item i
            JOIN order_product p ON p.id = i.product_id
            JOIN order_service sv ON sv.id = i.service_id
            WHERE i.order_id = $1
            ORDER BY i.line_number
            "#,
        )
        .bind(&order_id_bytes)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(ItemRow::into_item)
        .collect::<AppResult<Vec<_>>>()?;

        let header = OrderHeader {
            id: ids::from_bytes(&header.id)?,
            reseller_id: ids::from_bytes(&header.reseller_id)?,
            customer_id: ids::from_bytes(&header.customer_id)?,
            status_id: ids::from_bytes(&header.status_id)?,
            status_name: header.status_name,
            created_date: header.created_date,
        };

        Ok(Some(OrderDetail::new(header, items)))
    }

    async fn list_orders_by_status(&self, status_name: &str) -> AppResult<Vec<OrderSummary>> {
        self.fetch_summaries(Some(status_name)).await
    }

    async fn update_status(
        &self,
        order_id: Uuid,
        new_status: &str,
        policy: &dyn TransitionPolicy,
    ) -> AppResult<OrderStatus> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, StatusRow>(
            r#"
            SELECT s.id, s.name
            FROM orders o
            JOIN order_status s ON s.id = o.status_id
            WHERE o.id = $1
            FOR UPDATE OF o
            "#,
        )
        .bind(ids::to_bytes(order_id))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order '{}'", order_id)))?
        .into_status()?;

        let target = sqlx::query_as::<_, StatusRow>(
            "SELECT id, name FROM order_status WHERE name = $1",
        )
        .bind(new_status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::InvalidStatus(new_status.to_string()))?
        .into_status()?;

        // Dropping the transaction rolls back and releases the row lock
        if !policy.allows(&current, &target) {
            return Err(AppError::InvalidStateTransition {
                from: current.name,
                to: target.name,
            });
        }

        sqlx::query("UPDATE orders SET status_id = $1 WHERE id = $2")
            .bind(ids::to_bytes(target.id))
            .bind(ids::to_bytes(order_id))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(current)
    }

    async fn insert_order(&self, draft: &OrderDraft) -> AppResult<Uuid> {
        let mut tx = self.db.begin().await?;

        let created = sqlx::query_as::<_, StatusRow>(
            "SELECT id, name FROM order_status WHERE name = $1",
        )
        .bind(WellKnownStatus::Created.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Configuration("Default status 'Created' not found".to_string()))?;

        let order_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO orders (id, reseller_id, customer_id, status_id, created_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(ids::to_bytes(order_id))
        .bind(ids::to_bytes(draft.reseller_id))
        .bind(ids::to_bytes(draft.customer_id))
        .bind(&created.id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for (line_number, item) in draft.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_item (id, order_id, line_number, service_id, product_id, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(ids::to_bytes(Uuid::new_v4()))
            .bind(ids::to_bytes(order_id))
            .bind(line_number as i32)
            .bind(ids::to_bytes(item.service_id))
            .bind(ids::to_bytes(item.product_id))
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order_id)
    }

    async fn monthly_profits(&self) -> AppResult<Vec<MonthlyProfit>> {
        let rows = sqlx::query_as::<_, ProfitRow>(
            r#"
            SELECT EXTRACT(YEAR FROM o.created_date AT TIME ZONE 'UTC')::INT AS year,
                   EXTRACT(MONTH FROM o.created_date AT TIME ZONE 'UTC')::INT AS month,
                   COALESCE(SUM((p.unit_price - p.unit_cost) * COALESCE(i.quantity, 0)), 0) AS total_profit
            FROM orders o
            JOIN order_status s ON s.id = o.status_id
            LEFT JOIN order_item i ON i.order_id = o.id
            LEFT JOIN order_product p ON p.id = i.product_id
            WHERE s.name = $1
            GROUP BY 1, 2
            ORDER BY 1 DESC, 2 DESC
            "#,
        )
        .bind(WellKnownStatus::Completed.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| -> AppResult<MonthlyProfit> {
                let month = u32::try_from(row.month)
                    .map_err(|_| AppError::Internal(format!("Invalid month {}", row.month)))?;
                Ok(MonthlyProfit {
                    year: row.year,
                    month,
                    total_profit: row.total_profit,
                })
            })
            .collect()
    }

    async fn list_statuses(&self) -> AppResult<Vec<OrderStatus>> {
        sqlx::query_as::<_, StatusRow>("SELECT id, name FROM order_status ORDER BY name")
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(StatusRow::into_status)
            .collect()
    }

    async fn find_status_exact(&self, name: &str) -> AppResult<Option<OrderStatus>> {
        sqlx::query_as::<_, StatusRow>("SELECT id, name FROM order_status WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.db)
            .await?
            .map(StatusRow::into_status)
            .transpose()
    }

    async fn find_status_case_insensitive(&self, name: &str) -> AppResult<Option<OrderStatus>> {
        sqlx::query_as::<_, StatusRow>(
            "SELECT id, name FROM order_status WHERE LOWER(name) = LOWER($1) ORDER BY name LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        .map(StatusRow::into_status)
        .transpose()
    }

    async fn current_status(&self, order_id: Uuid) -> AppResult<Option<OrderStatus>> {
        sqlx::query_as::<_, StatusRow>(
            r#"
            SELECT s.id, s.name
            FROM orders o
            JOIN order_status s ON s.id = o.status_id
            WHERE o.id = $1
            "#,
        )
        .bind(ids::to_bytes(order_id))
        .fetch_optional(&self.db)
        .await?
        .map(StatusRow::into_status)
        .transpose()
    }

    async fn find_product(&self, product_id: Uuid) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, service_id, name, unit_cost, unit_price FROM order_product WHERE id = $1",
        )
        .bind(ids::to_bytes(product_id))
        .fetch_optional(&self.db)
        .await?;

        row.map(|row| -> AppResult<Product> {
            Ok(Product {
                id: ids::from_bytes(&row.id)?,
                service_id: ids::from_bytes(&row.service_id)?,
                name: row.name,
                unit_cost: row.unit_cost,
                unit_price: row.unit_price,
            })
        })
        .transpose()
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
