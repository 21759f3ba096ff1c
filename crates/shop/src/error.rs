//! Error taxonomy for catalog reads and order placement.

use common::ProductId;
use store::StoreError;
use thiserror::Error;

/// Errors returned by the catalog and the order coordinator.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The request is missing required data or carries invalid values.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A product does not exist or has fewer units than requested.
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// An internal invariant of the order transaction was violated.
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Storage could not be reached or failed while executing a statement.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl ShopError {
    /// Returns true if the error was caused by the client's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ShopError::InvalidRequest(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ShopError::InvalidRequest(_) => "invalid_request",
            ShopError::InsufficientStock(_) => "insufficient_stock",
            ShopError::TransactionError(_) => "transaction_error",
            ShopError::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

/// Convenience type alias for shop results.
pub type Result<T> = std::result::Result<T, ShopError>;
