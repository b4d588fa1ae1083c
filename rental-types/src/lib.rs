//! # Rental Types
//!
//! Domain types and port traits for the car rental service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, Car, Reservation, ...)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Caller, Car, CarId, CreditCard, CreditCardId, MAX_RENTAL_HOURS, Money, NewRental, NewUser,
    Package, PackageId, Pickup, RentalId, RentalRecord, Reservation, ReservationId, Session,
    SessionId, User, UserId,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    CatalogRepository, PaymentRepository, RentalRepository, Repository, UserRepository,
};
