use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::product::Product;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "29.99"
    pub price: String,
    pub stock: i32,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            stock: p.stock,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Product catalog", body = [ProductResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    tag = "products"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let products = web::block(move || state.catalog.list_products())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let data: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = web::block(move || state.catalog.get_product(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(p) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ProductResponse::from(p)
        }))),
        None => Err(AppError::NotFound("Product not found".to_string())),
    }
}
