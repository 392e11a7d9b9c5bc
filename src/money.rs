//! Dollar amounts expressed in whole cents.
//!
//! Input amounts are written in dollars (`"123.45"`); ABA records carry them
//! as integer cents. Parsing goes through `rust_decimal` so no floating-point
//! rounding is ever involved.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a dollar amount cannot be converted to cents.
#[derive(Error, Debug)]
pub enum AmountError {
    #[error("not a decimal number: {0}")]
    Parse(#[from] rust_decimal::Error),

    #[error("more than two decimal places: {0}")]
    FractionalCents(String),

    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// A signed amount of money in cents. Positive is a credit, negative a debit.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use aba_direct_entry::Cents;
///
/// let amount = Cents::from_str("100.5").unwrap();
/// assert_eq!(amount.get(), 10050);
/// assert_eq!(amount.to_string(), "100.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Cents(i64);

impl Cents {
    /// Number of decimal places in a dollar amount.
    pub const SCALE: u32 = 2;

    pub fn new(cents: i64) -> Self {
        Cents(cents)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Converts a dollar amount, rejecting sub-cent precision.
    pub fn from_dollars(dollars: Decimal) -> Result<Self, AmountError> {
        let normalized = dollars.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(AmountError::FractionalCents(dollars.to_string()));
        }

        let cents = normalized
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .ok_or_else(|| AmountError::OutOfRange(dollars.to_string()))?;
        Ok(Cents(cents))
    }
}

impl FromStr for Cents {
    type Err = AmountError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())?;
        Cents::from_dollars(decimal)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = Decimal::new(self.0, Self::SCALE);
        write!(f, "{:.2}", dollars)
    }
}
