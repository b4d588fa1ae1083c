//! Credit card management.

use std::sync::Arc;

use rental_types::{
    AppError, AttachCardRequest, Caller, CreditCard, DomainError, Money, PaymentRepository,
};

use super::reject;

/// Application service for the caller's stored-value card.
pub struct PaymentService<R: PaymentRepository> {
    repo: Arc<R>,
}

impl<R: PaymentRepository> PaymentService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Attaches a card with a zero balance.
    #[tracing::instrument(skip(self, caller, req), fields(user_id = %caller.user_id))]
    pub async fn attach_card(
        &self,
        caller: &Caller,
        req: AttachCardRequest,
    ) -> Result<CreditCard, AppError> {
        req.validate()?;

        let card = self
            .repo
            .attach_card(caller.user_id, req)
            .await
            .map_err(|e| reject("attach_card", e))?;

        tracing::info!(card_id = %card.id, "Credit card attached");
        Ok(card)
    }

    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn get_card(&self, caller: &Caller) -> Result<CreditCard, AppError> {
        self.repo
            .get_card(caller.user_id)
            .await
            .map_err(|e| reject("get_card", e))?
            .ok_or_else(|| DomainError::NoCreditCard.into())
    }

    /// Adds `amount` minor units to the caller's card.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn add_funds(&self, caller: &Caller, amount: i64) -> Result<CreditCard, AppError> {
        if amount <= 0 {
            return Err(DomainError::Validation("amount must be positive".into()).into());
        }
        let amount = Money::new(amount)?;

        let card = self
            .repo
            .add_funds(caller.user_id, amount)
            .await
            .map_err(|e| reject("add_funds", e))?;

        tracing::info!(balance = %card.balance, "Funds added");
        Ok(card)
    }

    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn remove_card(&self, caller: &Caller) -> Result<(), AppError> {
        let removed = self
            .repo
            .remove_card(caller.user_id)
            .await
            .map_err(|e| reject("remove_card", e))?;

        if !removed {
            return Err(DomainError::NoCreditCard.into());
        }
        tracing::info!("Credit card removed");
        Ok(())
    }
}
