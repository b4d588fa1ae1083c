//! Car pickup: turn a reservation into a rental.

use std::sync::Arc;

use rental_types::{AppError, Caller, CarId, Pickup, RentalRecord, RentalRepository};

use super::reject;

/// Application service for handing out cars.
pub struct DeliveryService<R: RentalRepository> {
    repo: Arc<R>,
}

impl<R: RentalRepository> DeliveryService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Consumes the caller's reservation against `car_id`.
    ///
    /// On success the car is no longer available, a rental record exists
    /// and the caller holds no reservation. Any failure leaves all three
    /// untouched.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id, car_id = %car_id))]
    pub async fn pick_up(&self, caller: &Caller, car_id: CarId) -> Result<Pickup, AppError> {
        let pickup = self
            .repo
            .pick_up(caller.user_id, car_id)
            .await
            .map_err(|e| reject("pick_up", e))?;

        tracing::info!(
            rental_id = %pickup.rental.id,
            ends_at = %pickup.rental.ends_at,
            "Car picked up"
        );
        Ok(pickup)
    }

    /// Rental history of the caller, newest first.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn list_rentals(&self, caller: &Caller) -> Result<Vec<RentalRecord>, AppError> {
        self.repo
            .list_rentals(caller.user_id)
            .await
            .map_err(|e| reject("list_rentals", e))
    }
}
