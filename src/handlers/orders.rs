use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::order::{OrderView, PlacedOrder};
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemSummaryResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: String,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderPlacedResponse {
    pub order_number: String,
    pub total: String,
    pub items_summary: Vec<ItemSummaryResponse>,
    pub address: String,
    pub phone: String,
    pub status: String,
    pub created_at: String,
}

impl From<PlacedOrder> for OrderPlacedResponse {
    fn from(order: PlacedOrder) -> Self {
        OrderPlacedResponse {
            order_number: order.order_number,
            total: order.total.to_string(),
            items_summary: order
                .lines
                .into_iter()
                .map(|l| ItemSummaryResponse {
                    product_id: l.product_id,
                    product_name: l.product_name,
                    quantity: l.quantity,
                    price: l.unit_price.to_string(),
                    subtotal: l.subtotal.to_string(),
                })
                .collect(),
            address: order.address,
            phone: order.phone,
            status: order.status.as_str().to_string(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub address: String,
    pub phone: String,
    pub total: String,
    pub status: String,
    pub created_at: String,
    pub order_items: Vec<OrderLineResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            order_number: order.order_number,
            address: order.address,
            phone: order.phone,
            total: order.total.to_string(),
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
            order_items: order
                .lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    id: l.id,
                    product_id: l.product_id,
                    product_name: l.product_name,
                    quantity: l.quantity,
                    price: l.unit_price.to_string(),
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Runs the checkout transaction for the authenticated user's cart: a
/// validation pass over the cart snapshot, then an atomic commit pass
/// (order, lines, stock decrements, cart clearing) that either fully
/// succeeds or leaves no trace.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderPlacedResponse),
        (status = 400, description = "Empty cart or insufficient stock"),
        (status = 422, description = "Missing address or phone"),
        (status = 500, description = "Checkout failed; all writes rolled back"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.address.trim().is_empty() {
        return Err(AppError::Validation(
            "The address field is required".to_string(),
        ));
    }
    if body.phone.trim().is_empty() {
        return Err(AppError::Validation(
            "The phone field is required".to_string(),
        ));
    }

    let order = web::block(move || state.checkout.checkout(user.0, &body.address, &body.phone))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    log::info!(
        "order {} placed for user {} ({} lines)",
        order.order_number,
        user.0,
        order.lines.len()
    );

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Order created successfully",
        "data": OrderPlacedResponse::from(order)
    })))
}

/// GET /orders
///
/// The authenticated user's orders, newest first, with line and product
/// detail.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Order history", body = [OrderResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || state.checkout.list_orders(user.0))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let data: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
}
