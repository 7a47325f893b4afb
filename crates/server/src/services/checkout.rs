//! Checkout workflow.
//!
//! Converts a set of requested lines into a committed order while reserving
//! stock. The whole operation is one `PostgreSQL` transaction: every stock
//! decrement, the order insert, and the cart cleanup either all commit or
//! all roll back. No reader ever observes a partial decrement.
//!
//! Unit prices are always taken from the catalog row read inside the
//! transaction. A client-submitted price is never trusted.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use farm_village_core::{AccountId, OrderId, PaymentMethod, ProductId};

use crate::db::RepositoryError;

/// One requested line of an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A checkout request.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub lines: Vec<OrderLineRequest>,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
}

/// The result of a committed checkout.
#[derive(Debug, Clone, Copy)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub total: Decimal,
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request is malformed (empty lines, blank address, bad quantity).
    #[error("{0}")]
    Validation(String),

    /// A requested product does not exist or cannot be purchased.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A product has less stock than requested.
    #[error("insufficient stock for {name}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: i32,
        requested: i32,
    },

    /// Database failure; the transaction was rolled back.
    #[error("order failed: {0}")]
    Failed(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Failed(RepositoryError::Database(e))
    }
}

/// Catalog data read (and locked) inside the checkout transaction.
#[derive(Debug, sqlx::FromRow)]
struct LockedProductRow {
    name: String,
    unit_price: Decimal,
    quantity: i32,
    active: bool,
    verified: bool,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order: validate, reserve stock, and append to the ledger.
    ///
    /// Matching cart lines are cleared in the same transaction, so a
    /// successful checkout leaves the cart consistent with the ledger.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` before any mutation is attempted.
    /// Returns `CheckoutError::ProductNotFound` or
    /// `CheckoutError::InsufficientStock` with the whole transaction rolled
    /// back; stock is untouched on every failure path.
    pub async fn place_order(
        &self,
        buyer_id: AccountId,
        request: &OrderRequest,
    ) -> Result<PlacedOrder, CheckoutError> {
        let lines = validate_request(request)?;

        let mut tx = self.pool.begin().await?;

        // Lock and price each product, then decrement. Lines are sorted by
        // product id (see validate_request) so two concurrent checkouts
        // always lock rows in the same order and cannot deadlock.
        let mut total = Decimal::ZERO;
        let mut snapshots = Vec::with_capacity(lines.len());

        for line in &lines {
            let product = lock_product(&mut tx, line.product_id).await?;

            let Some(product) = product else {
                return Err(CheckoutError::ProductNotFound(line.product_id));
            };

            if !product.active || !product.verified {
                return Err(CheckoutError::ProductNotFound(line.product_id));
            }

            if product.quantity < line.quantity {
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id,
                    name: product.name,
                    available: product.quantity,
                    requested: line.quantity,
                });
            }

            decrement_stock(&mut tx, line.product_id, line.quantity, &product.name).await?;

            total += product.unit_price * Decimal::from(line.quantity);
            snapshots.push((line.product_id, product.name, line.quantity, product.unit_price));
        }

        let order_id = insert_order(&mut tx, buyer_id, total, request).await?;

        for (product_id, name, quantity, unit_price) in &snapshots {
            sqlx::query(
                "INSERT INTO order_line (order_id, product_id, product_name, quantity, unit_price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(order_id)
            .bind(product_id)
            .bind(name)
            .bind(quantity)
            .bind(unit_price)
            .execute(&mut *tx)
            .await?;
        }

        clear_cart_lines(&mut tx, buyer_id, &lines).await?;

        tx.commit().await?;

        tracing::info!(%buyer_id, %order_id, %total, lines = lines.len(), "order placed");

        Ok(PlacedOrder { order_id, total })
    }
}

/// Validate and normalize a checkout request.
///
/// Duplicate product ids merge into one line, and lines come back sorted by
/// product id so the transaction locks rows in a stable order.
fn validate_request(request: &OrderRequest) -> Result<Vec<OrderLineRequest>, CheckoutError> {
    if request.lines.is_empty() {
        return Err(CheckoutError::Validation("order has no lines".to_owned()));
    }

    if request.delivery_address.trim().is_empty() {
        return Err(CheckoutError::Validation(
            "delivery address is required".to_owned(),
        ));
    }

    for line in &request.lines {
        if line.quantity <= 0 {
            return Err(CheckoutError::Validation(format!(
                "quantity for product {} must be positive",
                line.product_id
            )));
        }
    }

    let mut merged: Vec<OrderLineRequest> = Vec::with_capacity(request.lines.len());
    for line in &request.lines {
        match merged.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(*line),
        }
    }

    merged.sort_by_key(|l| l.product_id.as_i32());

    Ok(merged)
}

/// Read one product `FOR UPDATE`, serializing racing checkouts on it.
async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<Option<LockedProductRow>, CheckoutError> {
    let row = sqlx::query_as::<_, LockedProductRow>(
        "SELECT name, unit_price, quantity, active,
                (verification = 'verified') AS verified
         FROM product
         WHERE id = $1
         FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row)
}

/// Guarded decrement: refuses to take stock below zero.
async fn decrement_stock(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    quantity: i32,
    name: &str,
) -> Result<(), CheckoutError> {
    let result = sqlx::query(
        "UPDATE product
         SET quantity = quantity - $1, updated_at = now()
         WHERE id = $2 AND quantity >= $1",
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut **tx)
    .await?;

    // The FOR UPDATE check above makes this unreachable, but the guard stays:
    // stock must never go negative even if the read path changes.
    if result.rows_affected() == 0 {
        return Err(CheckoutError::InsufficientStock {
            product_id,
            name: name.to_owned(),
            available: 0,
            requested: quantity,
        });
    }

    Ok(())
}

/// Insert the order header and return its id.
async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    buyer_id: AccountId,
    total: Decimal,
    request: &OrderRequest,
) -> Result<OrderId, CheckoutError> {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO orders (buyer_id, total, delivery_address, payment_method)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(buyer_id)
    .bind(total)
    .bind(request.delivery_address.trim())
    .bind(request.payment_method)
    .fetch_one(&mut **tx)
    .await?;

    Ok(OrderId::new(id))
}

/// Remove the cart lines the order fulfilled.
async fn clear_cart_lines(
    tx: &mut Transaction<'_, Postgres>,
    buyer_id: AccountId,
    lines: &[OrderLineRequest],
) -> Result<(), CheckoutError> {
    let product_ids: Vec<i32> = lines.iter().map(|l| l.product_id.as_i32()).collect();

    sqlx::query("DELETE FROM cart_line WHERE buyer_id = $1 AND product_id = ANY($2)")
        .bind(buyer_id)
        .bind(&product_ids)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(lines: Vec<OrderLineRequest>) -> OrderRequest {
        OrderRequest {
            lines,
            delivery_address: "Village Road 1".to_owned(),
            payment_method: PaymentMethod::CashOnDelivery,
        }
    }

    fn line(product_id: i32, quantity: i32) -> OrderLineRequest {
        OrderLineRequest {
            product_id: ProductId::new(product_id),
            quantity,
        }
    }

    #[test]
    fn test_validate_rejects_empty_lines() {
        let err = validate_request(&request(vec![])).unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_blank_address() {
        let mut req = request(vec![line(1, 1)]);
        req.delivery_address = "   ".to_owned();
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        for bad in [0, -3] {
            let err = validate_request(&request(vec![line(1, bad)])).unwrap_err();
            assert!(matches!(err, CheckoutError::Validation(_)));
        }
    }

    #[test]
    fn test_validate_merges_duplicate_products() {
        let lines = validate_request(&request(vec![line(7, 2), line(7, 3)])).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
    }

    #[test]
    fn test_validate_sorts_lines_by_product_id() {
        let lines = validate_request(&request(vec![line(9, 1), line(2, 1), line(5, 1)])).unwrap();
        let ids: Vec<i32> = lines.iter().map(|l| l.product_id.as_i32()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
