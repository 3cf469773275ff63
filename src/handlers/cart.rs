use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::cart::CartLine;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: String,
    pub subtotal: String,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        let subtotal = line.subtotal();
        CartLineResponse {
            id: line.id,
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            price: line.unit_price.to_string(),
            subtotal: subtotal.to_string(),
        }
    }
}

fn require_positive_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::Validation(
            "The quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart contents", body = [CartLineResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    tag = "cart"
)]
pub async fn list_cart(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let lines = web::block(move || state.cart.list_cart(user.0))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let data: Vec<CartLineResponse> = lines.into_iter().map(CartLineResponse::from).collect();
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
}

/// POST /cart
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added to cart"),
        (status = 400, description = "Insufficient stock"),
        (status = 422, description = "Unknown product or invalid quantity"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    require_positive_quantity(body.quantity)?;

    let line = web::block(move || state.cart.add_item(user.0, body.product_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Item added to cart",
        "data": { "id": line.id, "product_id": line.product_id, "quantity": line.quantity }
    })))
}

/// PUT /cart/{id}
#[utoipa::path(
    put,
    path = "/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart line UUID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Cart item updated"),
        (status = 400, description = "Insufficient stock"),
        (status = 404, description = "Cart item not found"),
        (status = 422, description = "Invalid quantity"),
    ),
    tag = "cart"
)]
pub async fn update_item(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let line_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    require_positive_quantity(quantity)?;

    let line = web::block(move || state.cart.update_item(user.0, line_id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Cart item updated",
        "data": { "id": line.id, "product_id": line.product_id, "quantity": line.quantity }
    })))
}

/// DELETE /cart/{id}
#[utoipa::path(
    delete,
    path = "/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart line UUID"),
    ),
    responses(
        (status = 200, description = "Cart item removed"),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let line_id = path.into_inner();
    web::block(move || state.cart.remove_item(user.0, line_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Cart item removed"
    })))
}
