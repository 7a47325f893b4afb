//! Order ledger models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use farm_village_core::{AccountId, OrderId, OrderLineId, OrderStatus, PaymentMethod, ProductId};

/// A committed order.
///
/// Orders are financial snapshots: the total and every line's unit price are
/// fixed at checkout time and never recomputed, even if catalog prices
/// change later. Only `status` ever mutates, and only forward.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: AccountId,
    pub total: Decimal,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order, snapshotted at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub product_id: ProductId,
    /// Product name at the time of purchase.
    pub product_name: String,
    pub quantity: i32,
    /// Catalog price at the time of purchase.
    pub unit_price: Decimal,
}

impl Order {
    /// Sum of `quantity * unit_price` across lines.
    ///
    /// Used to sanity-check ledger rows; the stored `total` is authoritative.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let order = Order {
            id: OrderId::new(1),
            buyer_id: AccountId::new(2),
            total: Decimal::new(2350, 2),
            delivery_address: "Village Road 1".to_owned(),
            payment_method: PaymentMethod::CashOnDelivery,
            status: OrderStatus::Pending,
            lines: vec![
                OrderLine {
                    id: OrderLineId::new(1),
                    product_id: ProductId::new(10),
                    product_name: "Tomato".to_owned(),
                    quantity: 3,
                    unit_price: Decimal::new(450, 2),
                },
                OrderLine {
                    id: OrderLineId::new(2),
                    product_id: ProductId::new(11),
                    product_name: "Eggs".to_owned(),
                    quantity: 2,
                    unit_price: Decimal::new(500, 2),
                },
            ],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(order.line_total(), Decimal::new(2350, 2));
        assert_eq!(order.line_total(), order.total);
    }
}
