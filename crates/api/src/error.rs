//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shop::ShopError;

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as `{"success": false, "message": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Reading the catalog failed.
    Catalog(ShopError),
    /// Placing an order failed.
    Order(ShopError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(err) => (
                shop_error_status(&err),
                format!("Could not load products: {err}"),
            ),
            ApiError::Order(err) if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Order(err) => (shop_error_status(&err), format!("Order failed: {err}")),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        } else {
            tracing::debug!(error = %message, "request rejected");
        }

        let body = serde_json::json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

fn shop_error_status(err: &ShopError) -> StatusCode {
    match err {
        ShopError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ShopError::InsufficientStock(_)
        | ShopError::TransactionError(_)
        | ShopError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use common::ProductId;
    use store::StoreError;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            shop_error_status(&ShopError::InvalidRequest("missing cart".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            shop_error_status(&ShopError::InsufficientStock(ProductId::new(1))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            shop_error_status(&ShopError::TransactionError("order id not generated".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            shop_error_status(&ShopError::StorageUnavailable(StoreError::Unavailable(
                "down".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_order_client_error_is_bad_request() {
        let response =
            ApiError::Order(ShopError::InvalidRequest("missing customer".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_order_stock_error_is_server_error() {
        let response =
            ApiError::Order(ShopError::InsufficientStock(ProductId::new(3))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
