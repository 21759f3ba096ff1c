//! Shared types for the storefront backend.

pub mod money;
pub mod types;

pub use money::{MONEY_SCALE, Money};
pub use rust_decimal::Decimal;
pub use types::{CustomerId, OrderId, ProductId};
