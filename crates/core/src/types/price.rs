//! Decimal price representation with minor-unit conversion.
//!
//! Catalog prices are stored in the currency's standard unit (dollars).
//! The payment gateway wants integer minor units (cents), so the
//! conversion lives here and nowhere else.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a USD price.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Convert to integer minor units (cents for USD), rounding halves
    /// away from zero.
    ///
    /// Returns `None` if the amount does not fit in an `i64` after scaling.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Lowercase code as the payment gateway expects it.
    #[must_use]
    pub const fn gateway_code(&self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
            Self::CAD => "cad",
            Self::AUD => "aud",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_whole_cents() {
        let price = Price::usd(Decimal::new(1000, 2)); // 10.00
        assert_eq!(price.minor_units(), Some(1000));
    }

    #[test]
    fn test_minor_units_rounds_sub_cent_amounts() {
        let price = Price::usd(Decimal::new(19995, 3)); // 19.995
        assert_eq!(price.minor_units(), Some(2000));

        let price = Price::usd(Decimal::new(19994, 3)); // 19.994
        assert_eq!(price.minor_units(), Some(1999));
    }

    #[test]
    fn test_minor_units_zero() {
        assert_eq!(Price::usd(Decimal::ZERO).minor_units(), Some(0));
    }

    #[test]
    fn test_display() {
        let price = Price::usd(Decimal::new(1999, 2));
        assert_eq!(price.display(), "$19.99");
    }

    #[test]
    fn test_gateway_code() {
        assert_eq!(CurrencyCode::USD.gateway_code(), "usd");
    }
}
