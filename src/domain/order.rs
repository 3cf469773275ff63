use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle state of an order. Checkout only ever produces `Pending`;
/// later states belong to fulfilment, which lives outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
        }
    }
}

/// One line of a committed order. `unit_price` is frozen at purchase time
/// and is never re-derived from the product's current price.
#[derive(Debug, Clone)]
pub struct PlacedOrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

/// The result of a successful checkout, returned to the caller once the
/// commit pass has fully persisted the order.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub id: Uuid,
    pub order_number: String,
    pub address: String,
    pub phone: String,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<PlacedOrderLine>,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub order_number: String,
    pub address: String,
    pub phone: String,
    pub total: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}
