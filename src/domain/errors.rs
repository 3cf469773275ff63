use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcomes of a checkout attempt.
///
/// `EmptyCart` and `InsufficientStock` are expected business results and
/// guarantee no side effects occurred. `Failed` wraps a storage or
/// transaction error and guarantees the commit pass was fully rolled back
/// before it surfaced.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient stock for product: {product_name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product_id: Uuid,
        product_name: String,
        available: i32,
        requested: i32,
    },

    /// The generated order number collided with an existing one. Internal
    /// retry signal only; the checkout service regenerates and retries, so
    /// this never reaches callers.
    #[error("Order number already taken")]
    OrderNumberTaken,

    #[error("Failed to create order: {0}")]
    Failed(String),
}

/// Failures of the cart mutation operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("The selected product does not exist")]
    ProductNotFound,
    #[error("Cart item not found")]
    LineNotFound,
    #[error("Insufficient stock")]
    InsufficientStock { available: i32, requested: i32 },
    #[error(transparent)]
    Storage(#[from] DomainError),
}
