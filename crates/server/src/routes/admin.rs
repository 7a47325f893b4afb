//! Admin handlers: the order ledger and the moderation queue.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use farm_village_core::{OrderId, OrderStatus, ProductId, VerificationStatus};

use crate::db::{OrderRepository, ProductRepository};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Order, Product};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// `GET /admin/orders` — the full ledger, most recent first.
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// `POST /admin/orders/{id}/status`
///
/// Only forward transitions are accepted; anything else is a 409.
pub async fn advance_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .advance_status(OrderId::new(id), req.status)
        .await?;

    tracing::info!(order_id = %order.id, status = %order.status, admin_id = %admin.id, "order status advanced");

    Ok(Json(order))
}

/// `GET /admin/products/pending` — the moderation queue, oldest first.
pub async fn pending_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_pending().await?;
    Ok(Json(products))
}

/// `POST /admin/products/{id}/verify`
pub async fn verify_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .set_verification(ProductId::new(id), VerificationStatus::Verified, None)
        .await?;

    tracing::info!(product_id = %product.id, admin_id = %admin.id, "listing verified");

    Ok(Json(product))
}

/// `POST /admin/products/{id}/reject`
pub async fn reject_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<Product>> {
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::Validation(
            "a rejection reason is required".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .set_verification(ProductId::new(id), VerificationStatus::Rejected, Some(reason))
        .await?;

    tracing::info!(product_id = %product.id, admin_id = %admin.id, "listing rejected");

    Ok(Json(product))
}
