//! Non-negative monetary amount in minor units.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Money stored in the smallest currency unit (cents).
///
/// The service is single-currency, so only the amount is carried. Arithmetic
/// is checked: an amount can never go below zero or silently wrap.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    ToSchema,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    /// Creates a new Money value.
    pub fn new(amount: i64) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::Validation("amount cannot be negative".into()));
        }
        Ok(Self(amount))
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn checked_add(&self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::Validation("amount overflows the balance".into()))
    }

    /// Checked subtraction - fails with `InsufficientFunds` instead of going negative.
    pub fn checked_sub(&self, other: Money) -> Result<Money, DomainError> {
        if self.0 < other.0 {
            return Err(DomainError::InsufficientFunds {
                available: self.0,
                requested: other.0,
            });
        }
        Ok(Money(self.0 - other.0))
    }

    /// Multiplies by a whole number of units (e.g. hours).
    pub fn checked_mul(&self, units: i64) -> Result<Money, DomainError> {
        if units < 0 {
            return Err(DomainError::Validation("multiplier cannot be negative".into()));
        }
        self.0
            .checked_mul(units)
            .map(Money)
            .ok_or_else(|| DomainError::Validation("amount overflows".into()))
    }
}

impl TryFrom<i64> for Money {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
