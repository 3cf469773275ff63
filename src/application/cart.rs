use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::errors::CartError;
use crate::domain::ports::{CartRepository, ProductRepository};

/// Cart mutations. Stock checks here are a courtesy to the shopper (reject
/// obviously unfillable quantities early); the checkout commit pass remains
/// the enforcement point for the stock floor.
pub struct CartService<P, C> {
    products: P,
    carts: C,
}

impl<P: ProductRepository, C: CartRepository> CartService<P, C> {
    pub fn new(products: P, carts: C) -> Self {
        Self { products, carts }
    }

    pub fn list_cart(&self, user_id: Uuid) -> Result<Vec<CartLine>, CartError> {
        Ok(self.carts.load_cart(user_id)?)
    }

    pub fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, CartError> {
        let product = self
            .products
            .find_by_id(product_id)?
            .ok_or(CartError::ProductNotFound)?;
        if product.stock < quantity {
            return Err(CartError::InsufficientStock {
                available: product.stock,
                requested: quantity,
            });
        }
        Ok(self.carts.upsert_line(user_id, product_id, quantity)?)
    }

    pub fn update_item(
        &self,
        user_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, CartError> {
        // Read the line first so the stock check runs against the product
        // actually referenced by it.
        let line = self
            .carts
            .load_cart(user_id)?
            .into_iter()
            .find(|l| l.id == line_id)
            .ok_or(CartError::LineNotFound)?;
        if line.stock < quantity {
            return Err(CartError::InsufficientStock {
                available: line.stock,
                requested: quantity,
            });
        }
        self.carts
            .update_quantity(user_id, line_id, quantity)?
            .ok_or(CartError::LineNotFound)
    }

    pub fn remove_item(&self, user_id: Uuid, line_id: Uuid) -> Result<(), CartError> {
        if self.carts.remove_line(user_id, line_id)? {
            Ok(())
        } else {
            Err(CartError::LineNotFound)
        }
    }
}
