use std::fmt::{self, Display};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AmountError;

/// Largest amount a UPN order can carry, in whole euros.
pub const AMOUNT_MAX_UNITS: u64 = 999_999_999;
/// Width of the amount line in the payload (two implied decimals).
pub const AMOUNT_DIGITS: usize = 11;

/// A payment amount in euros, guaranteed to be in `(0, 999_999_999]`.
///
/// The payload carries amounts as whole cents. Any fraction beyond the cent is
/// truncated, never rounded: `55.586` is written as `5558`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }
        if value > Decimal::from(AMOUNT_MAX_UNITS) {
            return Err(AmountError::AboveMaximum);
        }

        Ok(Self(value))
    }

    /// Whole cents, truncated toward zero.
    pub fn to_cents(&self) -> u64 {
        // In range by construction: at most 99_999_999_900 cents.
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.trunc())
            .and_then(|cents| cents.to_u64())
            .unwrap_or(0)
    }

    /// Fixed-width payload representation, e.g. `1.5` -> `00000000150`.
    pub fn to_upn_string(&self) -> String {
        format!("{:0width$}", self.to_cents(), width = AMOUNT_DIGITS)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let value = Decimal::from_str(trimmed).map_err(|_| AmountError::InvalidNumber {
            input: trimmed.to_string(),
        })?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
