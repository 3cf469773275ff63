use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::Product;

pub struct CatalogService<P> {
    products: P,
}

impl<P: ProductRepository> CatalogService<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.products.list()
    }

    pub fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.products.find_by_id(id)
    }
}
