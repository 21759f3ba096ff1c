use async_trait::async_trait;

use crate::{NewOrder, NewOrderItem, NewPayment, OrderId, Product, ProductId, Result};

/// Core trait for storage backends.
///
/// All implementations must be thread-safe (Send + Sync). A store holds no
/// request state; everything lives in the backing tables.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns every product whose stock quantity is strictly positive.
    ///
    /// Ordering is backend-defined.
    async fn list_available_products(&self) -> Result<Vec<Product>>;

    /// Opens a transaction.
    ///
    /// The returned handle exclusively owns one connection until it is
    /// committed, rolled back or dropped. Dropping it without committing
    /// discards every write made through it.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<()>;
}

/// Writes performed inside one open transaction.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Inserts an order row and returns the ID storage generated for it.
    ///
    /// Returns `None` if the backend did not report an ID.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<Option<OrderId>>;

    /// Subtracts `quantity` from the product's stock if, and only if, the
    /// current stock is at least `quantity`.
    ///
    /// This is a single check-and-update against storage. Returns `false`
    /// when no row was updated, meaning the product does not exist or has
    /// insufficient stock.
    async fn decrement_stock(&mut self, product_id: ProductId, quantity: i32) -> Result<bool>;

    /// Inserts one order line.
    async fn insert_order_item(&mut self, item: &NewOrderItem) -> Result<()>;

    /// Inserts the payment row for an order.
    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<()>;

    /// Makes every write in this transaction durable and visible.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards every write in this transaction.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
