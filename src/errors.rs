use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::{CartError, CheckoutError, DomainError};

/// HTTP-facing error type. Every variant renders the
/// `{success: false, message}` envelope expected by API clients; raw
/// storage errors never reach this layer undigested.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthenticated.")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Request shape problems: missing fields, bad values. Maps to 422.
    #[error("{0}")]
    Validation(String),

    /// Expected business outcomes (empty cart, insufficient stock).
    /// Maps to 400 and is never logged as a system error.
    #[error("{0}")]
    Business(String),

    #[error("{0}")]
    Internal(String),
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart | CheckoutError::InsufficientStock { .. } => {
                AppError::Business(e.to_string())
            }
            // OrderNumberTaken is consumed by the checkout service's retry
            // loop; reaching here means the retries were exhausted.
            CheckoutError::OrderNumberTaken | CheckoutError::Failed(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<CartError> for AppError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ProductNotFound => AppError::Validation(e.to_string()),
            CartError::LineNotFound => AppError::NotFound(e.to_string()),
            CartError::InsufficientStock { .. } => AppError::Business("Insufficient stock".to_string()),
            CartError::Storage(inner) => inner.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound("Not found".to_string()),
            DomainError::InvalidInput(msg) => AppError::Validation(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

fn envelope(message: &str) -> serde_json::Value {
    serde_json::json!({ "success": false, "message": message })
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized => HttpResponse::Unauthorized().json(envelope(&self.to_string())),
            AppError::NotFound(_) => HttpResponse::NotFound().json(envelope(&self.to_string())),
            AppError::Validation(_) => {
                HttpResponse::UnprocessableEntity().json(envelope(&self.to_string()))
            }
            AppError::Business(msg) => {
                log::debug!("checkout rejected: {msg}");
                HttpResponse::BadRequest().json(envelope(msg))
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {msg}");
                HttpResponse::InternalServerError().json(envelope(&self.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn unauthorized_returns_401() {
        assert_eq!(
            AppError::Unauthorized.error_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            AppError::NotFound("Cart item not found".to_string())
                .error_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn validation_returns_422() {
        assert_eq!(
            AppError::Validation("The address field is required".to_string())
                .error_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn business_returns_400() {
        assert_eq!(
            AppError::Business("Cart is empty".to_string())
                .error_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            AppError::Internal("boom".to_string()).error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn empty_cart_maps_to_business() {
        let err: AppError = CheckoutError::EmptyCart.into();
        assert!(matches!(err, AppError::Business(_)));
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn insufficient_stock_maps_to_business_with_detail() {
        let err: AppError = CheckoutError::InsufficientStock {
            product_id: Uuid::new_v4(),
            product_name: "Tablet 10\"".to_string(),
            available: 0,
            requested: 1,
        }
        .into();
        assert!(matches!(err, AppError::Business(_)));
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product: Tablet 10\". Available: 0, Requested: 1"
        );
    }

    #[test]
    fn checkout_failed_maps_to_internal() {
        let err: AppError = CheckoutError::Failed("db down".to_string()).into();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.to_string(), "Failed to create order: db down");
    }

    #[test]
    fn cart_product_not_found_maps_to_validation() {
        let err: AppError = CartError::ProductNotFound.into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn cart_line_not_found_maps_to_not_found() {
        let err: AppError = CartError::LineNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
