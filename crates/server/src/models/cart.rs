//! Cart models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use farm_village_core::{AccountId, CartLineId, ProductId};

/// One (buyer, product) cart entry.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub buyer_id: AccountId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the current catalog data it points at.
///
/// The product reference is weak: if the listing was deactivated after the
/// line was added, `available` reflects that and the line is unfulfillable
/// but not auto-deleted.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    /// Current catalog price, not a snapshot.
    pub unit_price: Decimal,
    /// Current stock on hand.
    pub stock: i32,
    /// Whether the listing can still be purchased at all.
    pub available: bool,
}
