//! Order ledger repository.
//!
//! Orders are written only by the checkout transaction
//! (see [`crate::services::checkout`]); this repository reads them back and
//! applies admin status transitions. Ledger rows are never deleted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use farm_village_core::{
    AccountId, OrderId, OrderLineId, OrderStatus, PaymentMethod, ProductId,
};

use super::RepositoryError;
use crate::models::{Order, OrderLine};

/// Internal row type for order header queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    buyer_id: i32,
    total: Decimal,
    delivery_address: String,
    payment_method: PaymentMethod,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: OrderLineId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: OrderId::new(self.id),
            buyer_id: AccountId::new(self.buyer_id),
            total: self.total,
            delivery_address: self.delivery_address,
            payment_method: self.payment_method,
            status: self.status,
            lines,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, buyer_id, total, delivery_address, payment_method, status, created_at, updated_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, product_id, product_name, quantity, unit_price
             FROM order_line
             WHERE order_id = $1
             ORDER BY id ASC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let order = row.into_order(lines.into_iter().map(Into::into).collect());

        // Stored total is authoritative; a mismatch means ledger corruption.
        if order.line_total() != order.total {
            tracing::warn!(
                order_id = %order.id,
                stored = %order.total,
                computed = %order.line_total(),
                "order total does not match its lines"
            );
        }

        Ok(Some(order))
    }

    /// List a buyer's order history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_buyer(&self, buyer_id: AccountId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE buyer_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(buyer_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// List every order on the ledger, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// Advance an order's status along the forward-only transition rules.
    ///
    /// The order row is locked while the transition is checked so concurrent
    /// admin updates serialize.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Conflict` if the transition is not allowed.
    pub async fn advance_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(OrderStatus,)> =
            sqlx::query_as("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((current,)) = current else {
            return Err(RepositoryError::NotFound);
        };

        if !current.can_transition_to(next) {
            return Err(RepositoryError::Conflict(format!(
                "cannot move order from {current} to {next}"
            )));
        }

        sqlx::query("UPDATE orders SET status = $1, updated_at = now() WHERE id = $2")
            .bind(next)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Fetch and attach order lines for a batch of order headers.
    async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let line_rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, product_id, product_name, quantity, unit_price
             FROM order_line
             WHERE order_id = ANY($1)
             ORDER BY id ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for line in line_rows {
            by_order.entry(line.order_id).or_default().push(line.into());
        }

        Ok(rows
            .into_iter()
            .map(|r| {
                let lines = by_order.remove(&r.id).unwrap_or_default();
                r.into_order(lines)
            })
            .collect())
    }
}
