//! Cart repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use farm_village_core::{AccountId, CartLineId, ProductId, VerificationStatus};

use super::RepositoryError;
use crate::models::{CartItem, CartLine};

/// Internal row type for cart line queries.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    buyer_id: i32,
    product_id: i32,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartLineId::new(row.id),
            buyer_id: AccountId::new(row.buyer_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for cart lines joined with their products.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    product_id: i32,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    stock: i32,
    active: bool,
    verification: VerificationStatus,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        let available = row.active && matches!(row.verification, VerificationStatus::Verified);
        Self {
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            stock: row.stock,
            available,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the quantity currently in the cart for one product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_quantity(
        &self,
        buyer_id: AccountId,
        product_id: ProductId,
    ) -> Result<Option<i32>, RepositoryError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT quantity FROM cart_line WHERE buyer_id = $1 AND product_id = $2")
                .bind(buyer_id)
                .bind(product_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(q,)| q))
    }

    /// Add a quantity to the cart, merging into an existing line.
    ///
    /// At most one line exists per (buyer, product); a repeat add increments
    /// that line instead of creating a second one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add(
        &self,
        buyer_id: AccountId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            "INSERT INTO cart_line (buyer_id, product_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (buyer_id, product_id)
             DO UPDATE SET quantity = cart_line.quantity + EXCLUDED.quantity,
                           updated_at = now()
             RETURNING id, buyer_id, product_id, quantity, created_at, updated_at",
        )
        .bind(buyer_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace the quantity on an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &self,
        buyer_id: AccountId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            "UPDATE cart_line
             SET quantity = $1, updated_at = now()
             WHERE buyer_id = $2 AND product_id = $3
             RETURNING id, buyer_id, product_id, quantity, created_at, updated_at",
        )
        .bind(quantity)
        .bind(buyer_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Remove a line from the cart.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        buyer_id: AccountId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_line WHERE buyer_id = $1 AND product_id = $2")
            .bind(buyer_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the buyer's cart joined with current catalog data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, buyer_id: AccountId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT c.product_id, p.name AS product_name, c.quantity,
                    p.unit_price, p.quantity AS stock, p.active, p.verification
             FROM cart_line c
             JOIN product p ON p.id = c.product_id
             WHERE c.buyer_id = $1
             ORDER BY c.created_at ASC",
        )
        .bind(buyer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
