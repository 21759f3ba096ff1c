//! Read-only view of the products that can be ordered.

use store::{Product, Store};

use crate::error::{Result, ShopError};

/// Reads available products from storage. Holds no state of its own.
pub struct Catalog<S: Store> {
    store: S,
}

impl<S: Store> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns every product with stock strictly greater than zero.
    ///
    /// Ordering is whatever the storage backend returns.
    #[tracing::instrument(skip(self))]
    pub async fn list_available_products(&self) -> Result<Vec<Product>> {
        metrics::counter!("catalog_reads_total").increment(1);

        let products = self
            .store
            .list_available_products()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "catalog read failed");
                ShopError::from(e)
            })?;

        tracing::debug!(count = products.len(), "catalog read");
        Ok(products)
    }
}
