//! Reservations and completed rentals.
//!
//! A [`Reservation`] is the single-use credential a user obtains by paying
//! for a package. Picking up a car consumes it and produces an immutable
//! [`RentalRecord`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::Car;
use super::id::{CarId, RentalId, ReservationId, UserId};
use crate::error::DomainError;

/// Longest rental that can be ordered, in hours (30 days).
pub const MAX_RENTAL_HOURS: i32 = 720;

/// A paid, not yet consumed reservation for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub id: ReservationId,
    pub user_id: UserId,
    /// Name of the reserved package
    #[schema(example = "Ordinary")]
    pub package: String,
    #[schema(example = 10)]
    pub hours: i32,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Checks whether this reservation may be exchanged for `car`.
    ///
    /// The package must match before availability is considered.
    pub fn authorize_pickup(&self, car: &Car) -> Result<(), DomainError> {
        if self.package != car.package {
            return Err(DomainError::PackageMismatch {
                reserved: self.package.clone(),
                car_package: car.package.clone(),
            });
        }
        if !car.available {
            return Err(DomainError::CarUnavailable(car.id));
        }
        Ok(())
    }

    /// Builds the ledger entry for a pickup starting at `started_at`.
    pub fn begin_rental(&self, car: &Car, started_at: DateTime<Utc>) -> NewRental {
        NewRental {
            user_id: self.user_id,
            car_id: car.id,
            brand: car.brand.clone(),
            model: car.model.clone(),
            started_at,
            ends_at: started_at + Duration::hours(i64::from(self.hours)),
        }
    }
}

/// Ledger entry before it is assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRental {
    pub user_id: UserId,
    pub car_id: CarId,
    pub brand: String,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl NewRental {
    pub fn with_id(self, id: RentalId) -> RentalRecord {
        RentalRecord {
            id,
            user_id: self.user_id,
            car_id: self.car_id,
            brand: self.brand,
            model: self.model,
            started_at: self.started_at,
            ends_at: self.ends_at,
        }
    }
}

/// An immutable record of a completed pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RentalRecord {
    pub id: RentalId,
    pub user_id: UserId,
    pub car_id: CarId,
    /// Brand at the time of pickup
    pub brand: String,
    /// Model at the time of pickup
    pub model: String,
    #[schema(value_type = String, example = "2024-01-01T10:00:00Z")]
    pub started_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-01-01T20:00:00Z")]
    pub ends_at: DateTime<Utc>,
}

/// Result of a successful pickup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Pickup {
    /// The car, now unavailable
    pub car: Car,
    pub rental: RentalRecord,
}
