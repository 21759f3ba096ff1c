//! Shared application state.

use shop::{Catalog, OrderCoordinator};
use store::Store;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub catalog: Catalog<S>,
    pub orders: OrderCoordinator<S>,
    pub store: S,
}

impl<S: Store + Clone> AppState<S> {
    /// Builds the catalog reader and order coordinator over one store.
    pub fn new(store: S) -> Self {
        Self {
            catalog: Catalog::new(store.clone()),
            orders: OrderCoordinator::new(store.clone()),
            store,
        }
    }
}
