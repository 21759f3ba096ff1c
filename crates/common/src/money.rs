use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of decimal places money amounts are stored with.
pub const MONEY_SCALE: u32 = 2;

/// A monetary amount with two decimal places.
///
/// Backed by a [`Decimal`] so sums and products of prices are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a money amount, rounding half-away-from-zero to cents.
    pub fn new(amount: Decimal) -> Self {
        let mut amount =
            amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(MONEY_SCALE);
        Self(amount)
    }

    /// Creates a money amount from a number of cents (e.g. 1000 = 10.00).
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_SCALE))
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(Decimal::new(0, MONEY_SCALE))
    }

    /// Returns the underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies the amount by a quantity, or `None` on overflow.
    pub fn checked_times(&self, quantity: i32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self::new)
    }

    /// Adds two amounts, or `None` on overflow.
    pub fn checked_add(&self, rhs: Money) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self::new)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Money::new)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_has_two_decimal_places() {
        assert_eq!(Money::from_cents(1000).to_string(), "10.00");
        assert_eq!(Money::from_cents(1999).to_string(), "19.99");
    }

    #[test]
    fn checked_times_is_exact() {
        let price = Money::from_cents(1999);
        assert_eq!(price.checked_times(3), Some(Money::from_cents(5997)));
    }

    #[test]
    fn checked_add_is_exact() {
        let a = Money::from_cents(3000);
        let b = Money::from_cents(500);
        assert_eq!(a.checked_add(b), Some(Money::from_cents(3500)));
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.checked_times(2), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(huge.checked_times(1), Some(huge));
    }

    #[test]
    fn new_rounds_to_cents() {
        let m = Money::new(Decimal::new(10005, 3));
        assert_eq!(m, Money::from_cents(1001));
    }

    #[test]
    fn serializes_with_two_decimal_places() {
        let m = Money::new(Decimal::new(105, 1));
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"10.50\"");
    }

    #[test]
    fn negative_detection() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(!Money::from_cents(1).is_negative());
    }

    #[test]
    fn deserializes_from_json_number() {
        let m: Money = serde_json::from_str("10.5").unwrap();
        assert_eq!(m, Money::from_cents(1050));
    }

    #[test]
    fn deserializes_largest_decimal_without_panicking() {
        let m: Money = serde_json::from_str("\"79228162514264337593543950335\"").unwrap();
        assert_eq!(m.amount(), Decimal::MAX);
    }

    #[test]
    fn deserializes_from_json_string() {
        let m: Money = serde_json::from_str("\"12.34\"").unwrap();
        assert_eq!(m, Money::from_cents(1234));
    }
}
