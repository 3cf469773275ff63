use bigdecimal::BigDecimal;
use uuid::Uuid;

/// One cart row joined with its product, as read by the cart snapshot at
/// the start of checkout. `unit_price` and `stock` are the product's values
/// at snapshot time; the validation pass compares against `stock`, and the
/// commit pass freezes `unit_price` into the order line.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub stock: i32,
}

impl CartLine {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}
