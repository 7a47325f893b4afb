//! Product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use farm_village_core::{AccountId, ProductId, VerificationStatus};

/// A seller listing.
///
/// `quantity` is the stock on hand. It is decremented only inside the
/// checkout transaction and can never go negative (the schema and the
/// guarded decrement both enforce this).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: AccountId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub active: bool,
    pub verification: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether buyers can see and purchase this listing.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.active && matches!(self.verification, VerificationStatus::Verified)
    }
}

/// Input for creating a listing.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}
