//! Type-safe price representation in integer minor currency units.
//!
//! Prices are carried as whole minor units (paise, cents) from the storage
//! boundary all the way through totals so that currency arithmetic never
//! touches floating point. Display formatting happens only at the edge.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A price in integer minor currency units.
///
/// ```
/// use shopsync_core::{CurrencyCode, Price};
///
/// let unit = Price::from_minor_units(499_900, CurrencyCode::INR);
/// assert_eq!(unit.minor_units(), 499_900);
/// assert_eq!(unit.display(), "₹4999.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the smallest indivisible unit of the currency.
    minor_units: i64,
    /// ISO 4217 currency code.
    currency: CurrencyCode,
}

impl Price {
    /// Create a price from minor units.
    #[must_use]
    pub const fn from_minor_units(minor_units: i64, currency: CurrencyCode) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self::from_minor_units(0, currency)
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Currency of this price.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// This unit price extended over a quantity, saturating at the i64
    /// boundary rather than wrapping.
    #[must_use]
    pub const fn line_value(&self, quantity: u32) -> Self {
        Self {
            minor_units: self.minor_units.saturating_mul(quantity as i64),
            currency: self.currency,
        }
    }

    /// Sum of two prices in the same currency, saturating.
    #[must_use]
    pub const fn saturating_add(&self, other: Self) -> Self {
        Self {
            minor_units: self.minor_units.saturating_add(other.minor_units),
            currency: self.currency,
        }
    }

    /// Format for display, e.g. `₹4999.00`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{self}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        write!(
            f,
            "{sign}{}{}.{:02}",
            self.currency.symbol(),
            abs / 100,
            abs % 100
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Currency display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }

    /// Parse an ISO 4217 code, e.g. from a storage row.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "INR" => Some(Self::INR),
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_value_uses_integer_arithmetic() {
        let unit = Price::from_minor_units(499, CurrencyCode::INR);
        assert_eq!(unit.line_value(2).minor_units(), 998);
    }

    #[test]
    fn test_line_value_saturates() {
        let unit = Price::from_minor_units(i64::MAX, CurrencyCode::USD);
        assert_eq!(unit.line_value(2).minor_units(), i64::MAX);
    }

    #[test]
    fn test_display_formats_minor_units() {
        let price = Price::from_minor_units(499_900, CurrencyCode::INR);
        assert_eq!(price.display(), "₹4999.00");

        let price = Price::from_minor_units(1_05, CurrencyCode::USD);
        assert_eq!(price.display(), "$1.05");
    }

    #[test]
    fn test_display_negative() {
        let price = Price::from_minor_units(-50, CurrencyCode::USD);
        assert_eq!(price.display(), "-$0.50");
    }

    #[test]
    fn test_serde_roundtrip() {
        let price = Price::from_minor_units(1997, CurrencyCode::INR);
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }

    #[test]
    fn test_currency_code_accessors() {
        assert_eq!(CurrencyCode::INR.symbol(), "₹");
        assert_eq!(CurrencyCode::GBP.code(), "GBP");
        assert_eq!(CurrencyCode::default(), CurrencyCode::INR);
    }
}
