//! Product repository for catalog operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use farm_village_core::{AccountId, ProductId, VerificationStatus};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: i32,
    pub seller_id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub active: bool,
    pub verification: VerificationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            seller_id: AccountId::new(row.seller_id),
            name: row.name,
            description: row.description,
            category: row.category,
            unit_price: row.unit_price,
            quantity: row.quantity,
            active: row.active,
            verification: row.verification,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, seller_id, name, description, category, unit_price, quantity, \
     active, verification, rejection_reason, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all listings visible to buyers (active and verified).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_visible(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE active = TRUE AND verification = 'verified'
             ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List all of one seller's listings, regardless of moderation state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_seller(
        &self,
        seller_id: AccountId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE seller_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List listings awaiting moderation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE verification = 'pending'
             ORDER BY created_at ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a new listing for a seller. Listings start as `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        seller_id: AccountId,
        new: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO product (seller_id, name, description, category, unit_price, quantity)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(seller_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.unit_price)
        .bind(new.quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Decide a pending listing: verify it, or reject it with a reason.
    ///
    /// The transition only applies while the listing is still `pending`;
    /// verified/rejected are terminal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the listing was already decided.
    pub async fn set_verification(
        &self,
        id: ProductId,
        status: VerificationStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE product
             SET verification = $1, rejection_reason = $2, updated_at = now()
             WHERE id = $3 AND verification = 'pending'
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(status)
        .bind(rejection_reason)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(r.into()),
            // Distinguish "missing" from "already decided"
            None => match self.get(id).await? {
                Some(_) => Err(RepositoryError::Conflict(
                    "listing has already been decided".to_owned(),
                )),
                None => Err(RepositoryError::NotFound),
            },
        }
    }
}
