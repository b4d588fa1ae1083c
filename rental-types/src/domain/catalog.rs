//! Catalog models: priced packages and the cars that belong to them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::id::{CarId, PackageId};
use super::money::Money;
use crate::error::DomainError;

/// A rental package with a flat hourly rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Package {
    pub id: PackageId,
    /// Unique package name used for lookups
    #[schema(example = "Ordinary")]
    pub name: String,
    /// Price per hour in minor units
    pub price_per_hour: Money,
}

impl Package {
    /// Total price of renting this package for `hours`.
    pub fn cost_for(&self, hours: i32) -> Result<Money, DomainError> {
        if hours <= 0 {
            return Err(DomainError::Validation("hours must be positive".into()));
        }
        self.price_per_hour.checked_mul(i64::from(hours))
    }
}

/// A rentable car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Car {
    pub id: CarId,
    #[schema(example = "WX 12345")]
    pub registration_number: String,
    #[schema(example = "Toyota")]
    pub brand: String,
    #[schema(example = "Corolla")]
    pub model: String,
    /// False while the car is out on a rental
    pub available: bool,
    /// Name of the owning package
    #[schema(example = "Ordinary")]
    pub package: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(price: i64) -> Package {
        Package {
            id: PackageId::new(1),
            name: "Ordinary".into(),
            price_per_hour: Money::new(price).unwrap(),
        }
    }

    #[test]
    fn test_cost_is_exact_for_every_hour_count() {
        let package = package(50);
        for hours in 1..=720 {
            assert_eq!(package.cost_for(hours).unwrap().amount(), 50 * i64::from(hours));
        }
    }

    #[test]
    fn test_cost_rejects_non_positive_hours() {
        assert!(matches!(
            package(50).cost_for(0),
            Err(DomainError::Validation(_))
        ));
    }
}
