//! Transactional storage for the storefront.
//!
//! The [`Store`] trait exposes the read-only catalog query and opens
//! [`StoreTransaction`]s for order placement. Two backends are provided:
//! PostgreSQL for production and an in-memory store for tests and local runs.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use common::{CustomerId, Money, OrderId, ProductId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use model::{
    NewOrder, NewOrderItem, NewPayment, OrderItemRecord, OrderRecord, OrderStatus, PaymentMethod,
    PaymentRecord, PaymentStatus, Product,
};
pub use postgres::PostgresStore;
pub use store::{Store, StoreTransaction};
