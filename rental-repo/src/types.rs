//! Database row types shared by the SQLite and PostgreSQL adapters.
//!
//! Both backends decode ids as `i64`, flags as `bool` and timestamps as
//! `DateTime<Utc>` (TEXT in SQLite, TIMESTAMPTZ in Postgres), so one set of
//! rows serves both.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use rental_types::{
    Car, CarId, CarSort, CreditCard, CreditCardId, Money, Package, PackageId, RentalId,
    RentalRecord, RepoError, Reservation, ReservationId, SortDirection, User, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Shared SQL fragments
// ─────────────────────────────────────────────────────────────────────────────

pub const SELECT_USER: &str =
    "SELECT id, username, email, password_hash, phone, created_at FROM users";

pub const SELECT_PACKAGE: &str = "SELECT id, name, price_per_hour FROM packages";

pub const SELECT_CAR: &str = "SELECT c.id, c.registration_number, c.brand, c.model, c.available, p.name AS package \
     FROM cars c JOIN packages p ON p.id = c.package_id";

pub const COUNT_CARS: &str =
    "SELECT COUNT(*) FROM cars c JOIN packages p ON p.id = c.package_id";

pub const SELECT_CARD: &str = "SELECT id, user_id, number, expiry_month, expiry_year, cvv, balance, created_at \
     FROM credit_cards";

pub const SELECT_RESERVATION: &str =
    "SELECT id, user_id, package, hours, created_at FROM reservations";

pub const SELECT_RENTAL: &str =
    "SELECT id, user_id, car_id, brand, model, started_at, ends_at FROM rentals";

/// ORDER BY column for a car listing.
pub fn car_sort_column(sort: CarSort) -> &'static str {
    match sort {
        CarSort::Id => "c.id",
        CarSort::Brand => "c.brand",
        CarSort::Model => "c.model",
        CarSort::Package => "p.name",
    }
}

pub fn sort_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// User row from database.
#[derive(FromRow)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl DbUser {
    pub fn into_domain(self) -> User {
        User {
            id: UserId::new(self.id),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            phone: self.phone,
            created_at: self.created_at,
        }
    }
}

/// Package row from database.
#[derive(FromRow)]
pub struct DbPackage {
    pub id: i64,
    pub name: String,
    pub price_per_hour: i64,
}

impl DbPackage {
    pub fn into_domain(self) -> Result<Package, RepoError> {
        Ok(Package {
            id: PackageId::new(self.id),
            name: self.name,
            price_per_hour: Money::new(self.price_per_hour)?,
        })
    }
}

/// Car row joined with its package name.
#[derive(FromRow)]
pub struct DbCar {
    pub id: i64,
    pub registration_number: String,
    pub brand: String,
    pub model: String,
    pub available: bool,
    pub package: String,
}

impl DbCar {
    pub fn into_domain(self) -> Car {
        Car {
            id: CarId::new(self.id),
            registration_number: self.registration_number,
            brand: self.brand,
            model: self.model,
            available: self.available,
            package: self.package,
        }
    }
}

/// Credit card row from database.
#[derive(FromRow)]
pub struct DbCreditCard {
    pub id: i64,
    pub user_id: i64,
    pub number: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
    pub cvv: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl DbCreditCard {
    pub fn into_domain(self) -> Result<CreditCard, RepoError> {
        Ok(CreditCard {
            id: CreditCardId::new(self.id),
            user_id: UserId::new(self.user_id),
            number: self.number,
            expiry_month: self.expiry_month,
            expiry_year: self.expiry_year,
            cvv: self.cvv,
            balance: Money::new(self.balance)?,
            created_at: self.created_at,
        })
    }
}

/// Reservation row from database.
#[derive(FromRow)]
pub struct DbReservation {
    pub id: i64,
    pub user_id: i64,
    pub package: String,
    pub hours: i32,
    pub created_at: DateTime<Utc>,
}

impl DbReservation {
    pub fn into_domain(self) -> Reservation {
        Reservation {
            id: ReservationId::new(self.id),
            user_id: UserId::new(self.user_id),
            package: self.package,
            hours: self.hours,
            created_at: self.created_at,
        }
    }
}

/// Rental ledger row from database.
#[derive(FromRow)]
pub struct DbRental {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    pub brand: String,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl DbRental {
    pub fn into_domain(self) -> RentalRecord {
        RentalRecord {
            id: RentalId::new(self.id),
            user_id: UserId::new(self.user_id),
            car_id: CarId::new(self.car_id),
            brand: self.brand,
            model: self.model,
            started_at: self.started_at,
            ends_at: self.ends_at,
        }
    }
}
