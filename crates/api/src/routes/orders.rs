//! Order placement endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use common::{Money, OrderId};
use serde::{Deserialize, Serialize};
use shop::CartLine;
use store::Store;

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub customer_id: Option<CustomerIdField>,
    #[serde(default)]
    pub cart: Option<Vec<CartLineRequest>>,
}

/// Customer IDs arrive either as JSON strings or as numbers. The number
/// `0` counts as no customer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CustomerIdField {
    Text(String),
    Number(i64),
}

impl CustomerIdField {
    fn into_customer_id(self) -> Option<String> {
        match self {
            CustomerIdField::Text(s) => Some(s),
            CustomerIdField::Number(0) => None,
            CustomerIdField::Number(n) => Some(n.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CartLineRequest {
    pub id: i32,
    pub price: Money,
    pub quantity: i32,
}

impl From<CartLineRequest> for CartLine {
    fn from(line: CartLineRequest) -> Self {
        CartLine::new(line.id, line.quantity, line.price)
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub order_id: OrderId,
    pub total_amount: Money,
    pub message: String,
}

// -- Handlers --

/// POST /api/place_order: place an order as one transaction.
#[tracing::instrument(skip(state, payload))]
pub async fn place<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<Json<PlaceOrderResponse>, ApiError> {
    let Json(req) = payload?;

    let customer_id = req
        .customer_id
        .and_then(CustomerIdField::into_customer_id)
        .unwrap_or_default();
    let lines: Vec<CartLine> = req
        .cart
        .unwrap_or_default()
        .into_iter()
        .map(CartLine::from)
        .collect();

    let receipt = state
        .orders
        .place_order(&customer_id, lines)
        .await
        .map_err(ApiError::Order)?;

    Ok(Json(PlaceOrderResponse {
        success: true,
        order_id: receipt.order_id,
        total_amount: receipt.total_amount,
        message: format!(
            "Order {} placed successfully! Total: ${}",
            receipt.order_id, receipt.total_amount
        ),
    }))
}
