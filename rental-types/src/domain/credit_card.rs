//! Stored-value credit card.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::id::{CreditCardId, UserId};
use super::money::Money;
use crate::error::DomainError;

/// The stored-value payment card attached to a user (at most one per user).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreditCard {
    pub id: CreditCardId,
    pub user_id: UserId,
    /// Card number, unique across all users
    #[schema(example = "4111111111111111")]
    pub number: String,
    #[schema(example = 12)]
    pub expiry_month: i32,
    #[schema(example = 2030)]
    pub expiry_year: i32,
    /// Security code, never sent over the wire
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub cvv: String,
    /// Current balance in minor units
    pub balance: Money,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub created_at: DateTime<Utc>,
}

impl CreditCard {
    /// Adds funds to the balance.
    pub fn credit(&mut self, amount: Money) -> Result<(), DomainError> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Removes funds from the balance; the balance never goes below zero.
    pub fn debit(&mut self, amount: Money) -> Result<(), DomainError> {
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }
}
