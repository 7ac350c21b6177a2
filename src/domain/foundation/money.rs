//! Monetary amount value object.
//!
//! Amounts are held as integer minor units (kopecks, cents) so arithmetic is
//! exact and matches what the payment gateway expects on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Supported settlement currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Eur,
    Rub,
}

impl Currency {
    /// Lowercase ISO-style code as the gateway expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Rub => "rub",
        }
    }

    /// Number of minor units per major unit.
    pub fn minor_per_major(&self) -> i64 {
        100
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "eur" => Ok(Currency::Eur),
            "rub" => Ok(Currency::Rub),
            other => Err(ValidationError::invalid_format(
                "currency",
                format!("Unsupported currency '{}'", other),
            )),
        }
    }
}

/// An exact monetary amount in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Creates an amount from minor units (e.g. 50000 kopecks).
    ///
    /// Negative amounts are rejected; prices and payments are never negative.
    pub fn from_minor_units(minor_units: i64, currency: Currency) -> Result<Self, ValidationError> {
        if minor_units < 0 {
            return Err(ValidationError::out_of_range(
                "amount",
                0,
                i64::MAX,
                minor_units,
            ));
        }
        Ok(Self {
            minor_units,
            currency,
        })
    }

    /// Creates an amount from whole major units (e.g. 500 rubles).
    pub fn from_major_units(major_units: i64, currency: Currency) -> Result<Self, ValidationError> {
        let minor = major_units
            .checked_mul(currency.minor_per_major())
            .ok_or_else(|| {
                ValidationError::invalid_format("amount", "Amount overflows minor units")
            })?;
        Self::from_minor_units(minor, currency)
    }

    /// Amount in minor units, as sent to the gateway.
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }
}

impl fmt::Display for Money {
    /// Renders as major units with two decimals, e.g. `500.00 rub`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let per = self.currency.minor_per_major();
        write!(
            f,
            "{}.{:02} {}",
            self.minor_units / per,
            self.minor_units % per,
            self.currency
        )
    }
}
