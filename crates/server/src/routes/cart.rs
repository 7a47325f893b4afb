//! Cart handlers.
//!
//! The cart is scoped by the caller's token identity; there is no way to
//! read or mutate another buyer's cart. Quantities are checked against live
//! stock at mutation time, and checkout re-validates independently.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use farm_village_core::ProductId;

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{ApiError, Result};
use crate::middleware::RequireBuyer;
use crate::models::{CartItem, CartLine, Product};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: i32,
}

/// `GET /cart`
pub async fn show(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool()).list(buyer.id).await?;
    Ok(Json(items))
}

/// `POST /cart` — add to the cart, merging into an existing line.
pub async fn add(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Json(req): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartLine>)> {
    let product_id = ProductId::new(req.product_id);
    let product = purchasable_product(&state, product_id).await?;

    let cart = CartRepository::new(state.pool());

    let existing = cart.get_quantity(buyer.id, product_id).await?.unwrap_or(0);
    check_quantity(req.quantity, existing, &product)?;

    let line = cart.add(buyer.id, product_id, req.quantity).await?;

    Ok((StatusCode::CREATED, Json(line)))
}

/// `PUT /cart/{product_id}` — replace the line's quantity.
pub async fn update(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Path(product_id): Path<i32>,
    Json(req): Json<UpdateCartRequest>,
) -> Result<Json<CartLine>> {
    let product_id = ProductId::new(product_id);
    let product = purchasable_product(&state, product_id).await?;

    check_quantity(req.quantity, 0, &product)?;

    let line = CartRepository::new(state.pool())
        .set_quantity(buyer.id, product_id, req.quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => ApiError::NotFound("cart line".to_owned()),
            other => ApiError::Database(other),
        })?;

    Ok(Json(line))
}

/// `DELETE /cart/{product_id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Path(product_id): Path<i32>,
) -> Result<StatusCode> {
    let removed = CartRepository::new(state.pool())
        .remove(buyer.id, ProductId::new(product_id))
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("cart line".to_owned()))
    }
}

/// Fetch a product buyers are allowed to put in a cart.
async fn purchasable_product(state: &AppState, product_id: ProductId) -> Result<Product> {
    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .filter(Product::is_visible)
        .ok_or_else(|| ApiError::NotFound("product".to_owned()))?;

    Ok(product)
}

/// Reject non-positive quantities and totals beyond the current stock.
fn check_quantity(requested: i32, already_in_cart: i32, product: &Product) -> Result<()> {
    if requested <= 0 {
        return Err(ApiError::Validation(
            "quantity must be a positive integer".to_owned(),
        ));
    }

    let wanted = already_in_cart.saturating_add(requested);
    if wanted > product.quantity {
        return Err(ApiError::Conflict(format!(
            "only {} of {} in stock",
            product.quantity, product.name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use farm_village_core::{AccountId, VerificationStatus};
    use rust_decimal::Decimal;

    fn product(stock: i32) -> Product {
        Product {
            id: ProductId::new(1),
            seller_id: AccountId::new(2),
            name: "Eggs".to_owned(),
            description: String::new(),
            category: "dairy".to_owned(),
            unit_price: Decimal::new(500, 2),
            quantity: stock,
            active: true,
            verification: VerificationStatus::Verified,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_quantity_rejects_non_positive() {
        assert!(check_quantity(0, 0, &product(10)).is_err());
        assert!(check_quantity(-2, 0, &product(10)).is_err());
    }

    #[test]
    fn test_check_quantity_counts_existing_cart_contents() {
        // 7 in the cart + 4 more > 10 in stock
        assert!(check_quantity(4, 7, &product(10)).is_err());
        assert!(check_quantity(3, 7, &product(10)).is_ok());
    }

    #[test]
    fn test_check_quantity_allows_exact_stock() {
        assert!(check_quantity(10, 0, &product(10)).is_ok());
        assert!(check_quantity(11, 0, &product(10)).is_err());
    }
}
