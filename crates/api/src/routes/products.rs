//! Catalog endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::Money;
use serde::Serialize;
use store::{Product, Store};

use crate::error::ApiError;
use crate::state::AppState;

/// One product as rendered to the storefront.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    #[serde(rename = "ProductID")]
    pub product_id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Price")]
    pub price: Money,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "StockQty")]
    pub stock_qty: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            product_id: p.id.as_i32(),
            name: p.name,
            price: p.price,
            category: p.category,
            stock_qty: p.stock_qty,
        }
    }
}

/// GET /api/products: list products that are in stock.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state
        .catalog
        .list_available_products()
        .await
        .map_err(ApiError::Catalog)?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}
