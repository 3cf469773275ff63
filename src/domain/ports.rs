use uuid::Uuid;

use super::cart::CartLine;
use super::errors::{CheckoutError, DomainError};
use super::order::{OrderView, PlacedOrder};
use super::product::Product;

pub trait ProductRepository: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<Product>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    /// Load the user's cart joined with current product data, in insertion
    /// order. An empty cart is a valid result, never an error.
    fn load_cart(&self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError>;

    /// Insert a cart line, or replace the quantity of the existing line for
    /// the same (user, product) pair.
    fn upsert_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, DomainError>;

    /// Update the quantity of a line owned by `user_id`. Returns `None` if
    /// no such line exists.
    fn update_quantity(
        &self,
        user_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartLine>, DomainError>;

    /// Delete a line owned by `user_id`. Returns whether a row was removed.
    fn remove_line(&self, user_id: Uuid, line_id: Uuid) -> Result<bool, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Execute the commit pass of checkout as a single atomic unit: create
    /// the order, one order line per cart line with the snapshot price
    /// frozen in, decrement each product's stock with a floor check, set
    /// the order total, and clear the user's cart. Either every write is
    /// visible or none is.
    ///
    /// The floor check inside this call is the sole enforcement point for
    /// the non-negative-stock invariant; a decrement rejected here (stock
    /// consumed by a concurrent checkout after the caller's validation
    /// pass) surfaces as `CheckoutError::Failed` after full rollback.
    fn commit_checkout(
        &self,
        user_id: Uuid,
        order_number: &str,
        address: &str,
        phone: &str,
        lines: &[CartLine],
    ) -> Result<PlacedOrder, CheckoutError>;

    /// All of the user's orders, newest first, with lines and product
    /// names joined.
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;
}
