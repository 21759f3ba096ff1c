//! Cart lines and request validation.

use common::{CustomerId, Money, ProductId};

use crate::error::{Result, ShopError};

/// One entry of a purchase request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price as supplied by the caller. It is recorded on the order
    /// line as-is.
    pub unit_price: Money,
}

impl CartLine {
    pub fn new(product_id: impl Into<ProductId>, quantity: i32, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns `unit_price * quantity`, or `None` if it overflows.
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_times(self.quantity)
    }
}

/// Sums the subtotals of all lines, or `None` if the sum overflows.
pub fn cart_total(lines: &[CartLine]) -> Option<Money> {
    lines
        .iter()
        .try_fold(Money::zero(), |total, line| total.checked_add(line.subtotal()?))
}

// Largest amounts the NUMERIC(12,2) price and NUMERIC(14,2) total columns hold.
const MAX_UNIT_PRICE_CENTS: i64 = 999_999_999_999;
const MAX_ORDER_TOTAL_CENTS: i64 = 99_999_999_999_999;

/// An order request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    customer_id: CustomerId,
    lines: Vec<CartLine>,
    total: Money,
}

impl ValidatedOrder {
    /// Checks the request without touching storage.
    ///
    /// The customer ID must be non-blank, the cart must have at least one
    /// line, and every line needs a positive quantity and a non-negative
    /// unit price.
    pub fn validate(customer_id: &str, lines: Vec<CartLine>) -> Result<Self> {
        let customer_id = customer_id.trim();
        if customer_id.is_empty() {
            return Err(ShopError::InvalidRequest("missing customer".to_string()));
        }
        if lines.is_empty() {
            return Err(ShopError::InvalidRequest("missing cart".to_string()));
        }

        for line in &lines {
            if line.quantity <= 0 {
                return Err(ShopError::InvalidRequest(format!(
                    "quantity for product {} must be positive, got {}",
                    line.product_id, line.quantity
                )));
            }
            if line.unit_price.is_negative() {
                return Err(ShopError::InvalidRequest(format!(
                    "price for product {} must not be negative, got {}",
                    line.product_id, line.unit_price
                )));
            }
            if line.unit_price > Money::from_cents(MAX_UNIT_PRICE_CENTS) {
                return Err(ShopError::InvalidRequest(format!(
                    "price for product {} is out of range",
                    line.product_id
                )));
            }
        }

        let total = cart_total(&lines)
            .filter(|total| *total <= Money::from_cents(MAX_ORDER_TOTAL_CENTS))
            .ok_or_else(|| ShopError::InvalidRequest("order total out of range".to_string()))?;
        Ok(Self {
            customer_id: CustomerId::new(customer_id),
            lines,
            total,
        })
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total amount of the order.
    pub fn total(&self) -> Money {
        self.total
    }
}
