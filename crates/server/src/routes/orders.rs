//! Checkout and order-history handlers.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use farm_village_core::{OrderId, PaymentMethod, ProductId};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireBuyer;
use crate::models::Order;
use crate::services::checkout::{CheckoutService, OrderLineRequest, OrderRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderLine {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub lines: Vec<PlaceOrderLine>,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub order_id: OrderId,
    pub total: Decimal,
}

/// `POST /orders` — run the checkout workflow for the caller's lines.
pub async fn place(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>)> {
    let request = OrderRequest {
        lines: req
            .lines
            .iter()
            .map(|l| OrderLineRequest {
                product_id: ProductId::new(l.product_id),
                quantity: l.quantity,
            })
            .collect(),
        delivery_address: req.delivery_address,
        payment_method: req.payment_method,
    };

    let placed = CheckoutService::new(state.pool())
        .place_order(buyer.id, &request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            order_id: placed.order_id,
            total: placed.total,
        }),
    ))
}

/// `GET /orders` — the caller's order history, most recent first.
pub async fn history(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_buyer(buyer.id)
        .await?;

    Ok(Json(orders))
}
