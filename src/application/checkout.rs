use uuid::Uuid;

use crate::domain::errors::{CheckoutError, DomainError};
use crate::domain::order::{OrderView, PlacedOrder};
use crate::domain::order_number;
use crate::domain::ports::{CartRepository, OrderRepository};

/// Attempts to allocate a unique order number before giving up. Collisions
/// are one-in-billions per attempt, so hitting this limit means something
/// other than bad luck is wrong.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 3;

/// The checkout transaction: an optimistic validation pass over a cart
/// snapshot, followed by an atomic commit pass delegated to the order
/// repository.
///
/// The validation pass is an early exit only. It reads stock from a
/// snapshot taken before the commit transaction opens, so two concurrent
/// checkouts over the same product can both pass it; the floor-checked
/// decrement inside `commit_checkout` is the actual enforcement point, and
/// its rejection surfaces as `CheckoutError::Failed` with everything
/// rolled back.
pub struct CheckoutService<C, O> {
    carts: C,
    orders: O,
}

impl<C: CartRepository, O: OrderRepository> CheckoutService<C, O> {
    pub fn new(carts: C, orders: O) -> Self {
        Self { carts, orders }
    }

    pub fn checkout(
        &self,
        user_id: Uuid,
        address: &str,
        phone: &str,
    ) -> Result<PlacedOrder, CheckoutError> {
        let lines = self
            .carts
            .load_cart(user_id)
            .map_err(|e| CheckoutError::Failed(e.to_string()))?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // Validation pass: all-or-nothing against the snapshot's stock.
        // The first violation aborts the whole checkout with no writes.
        for line in &lines {
            if line.quantity > line.stock {
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    available: line.stock,
                    requested: line.quantity,
                });
            }
        }

        // Commit pass. Order numbers are random, so regenerate and retry
        // on the rare unique-constraint collision.
        for _ in 0..MAX_ORDER_NUMBER_ATTEMPTS {
            let number = order_number::generate();
            match self
                .orders
                .commit_checkout(user_id, &number, address, phone, &lines)
            {
                Err(CheckoutError::OrderNumberTaken) => continue,
                other => return other,
            }
        }
        Err(CheckoutError::Failed(
            "could not allocate a unique order number".to_string(),
        ))
    }

    pub fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.orders.list_for_user(user_id)
    }
}
