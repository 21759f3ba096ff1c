//! Catalog reads and order placement for the storefront.
//!
//! - [`Catalog`] lists products that are in stock.
//! - [`OrderCoordinator`] places an order as a single all-or-nothing
//!   storage transaction: order row, guarded stock decrements, order lines
//!   and the payment row.

pub mod cart;
pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod phase;

pub use cart::{CartLine, ValidatedOrder, cart_total};
pub use catalog::Catalog;
pub use coordinator::{OrderCoordinator, OrderReceipt};
pub use error::{Result, ShopError};
pub use phase::OrderPhase;
