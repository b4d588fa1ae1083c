//! Order placement: pay for a package and receive a reservation.

use std::sync::Arc;

use rental_types::{AppError, Caller, DomainError, RentalRepository, Reservation, SubmitOrderRequest};

use super::reject;

/// Application service for orders.
///
/// Generic over the rental port so the adapter is injected at compile time.
pub struct OrderService<R: RentalRepository> {
    repo: Arc<R>,
}

impl<R: RentalRepository> OrderService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Debits the caller's card for `price_per_hour * hours` and issues a
    /// reservation for the package.
    ///
    /// Fails with `ExistingReservation`, `UnknownPackage`, `NoCreditCard` or
    /// `InsufficientFunds` (first failing check wins). Nothing is charged
    /// when it fails.
    #[tracing::instrument(
        skip(self, caller, req),
        fields(user_id = %caller.user_id, package = %req.package, hours = req.hours)
    )]
    pub async fn submit_order(
        &self,
        caller: &Caller,
        req: SubmitOrderRequest,
    ) -> Result<Reservation, AppError> {
        req.validate()?;

        let reservation = self
            .repo
            .submit_order(caller.user_id, &req)
            .await
            .map_err(|e| reject("submit_order", e))?;

        tracing::info!(reservation_id = %reservation.id, "Order placed");
        Ok(reservation)
    }

    /// Returns the caller's active reservation.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn current_reservation(&self, caller: &Caller) -> Result<Reservation, AppError> {
        self.repo
            .get_reservation(caller.user_id)
            .await
            .map_err(|e| reject("current_reservation", e))?
            .ok_or_else(|| DomainError::NoReservation.into())
    }
}
