//! Catalog handlers.
//!
//! Public callers only ever see active, verified listings. A seller sees all
//! of their own listings regardless of moderation state; admins see
//! everything.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use farm_village_core::{ProductId, Role};

use crate::db::ProductRepository;
use crate::error::{ApiError, Result};
use crate::middleware::{RequireAuth, RequireSeller};
use crate::models::{NewProduct, Product};
use crate::routes::categories::is_valid_category;
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 120;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// `GET /products` — public listing.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_visible().await?;
    Ok(Json(products))
}

/// `GET /products/{id}`
///
/// Hidden listings 404 for everyone except their seller and admins; a buyer
/// cannot probe the moderation queue.
pub async fn show(
    State(state): State<AppState>,
    caller: Option<RequireAuth>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("product".to_owned()))?;

    if !product.is_visible() {
        let may_see = caller.as_ref().is_some_and(|RequireAuth(account)| {
            account.role == Role::Admin
                || (account.role == Role::Seller && account.id == product.seller_id)
        });

        if !may_see {
            return Err(ApiError::NotFound("product".to_owned()));
        }
    }

    Ok(Json(product))
}

/// `POST /products` — create a listing; it starts in the moderation queue.
pub async fn create(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let new = validate_new_product(req)?;

    let product = ProductRepository::new(state.pool())
        .create(seller.id, &new)
        .await?;

    tracing::info!(product_id = %product.id, seller_id = %seller.id, "listing created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /products/mine` — the seller's listings, any moderation state.
pub async fn mine(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list_by_seller(seller.id)
        .await?;

    Ok(Json(products))
}

fn validate_new_product(req: CreateProductRequest) -> Result<NewProduct> {
    let name = req.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::Validation("product name is required".to_owned()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::Validation(format!(
            "product name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }

    if !is_valid_category(&req.category) {
        return Err(ApiError::Validation(format!(
            "unknown category '{}'",
            req.category
        )));
    }

    if req.unit_price < Decimal::ZERO {
        return Err(ApiError::Validation(
            "unit price cannot be negative".to_owned(),
        ));
    }

    if req.quantity < 0 {
        return Err(ApiError::Validation(
            "quantity cannot be negative".to_owned(),
        ));
    }

    Ok(NewProduct {
        name,
        description: req.description.trim().to_owned(),
        category: req.category,
        unit_price: req.unit_price,
        quantity: req.quantity,
    })
}
