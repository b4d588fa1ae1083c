//! Error types for the rental service.

use crate::domain::CarId;

/// Domain-level errors (business rule violations).
///
/// Every rejection a caller can receive from the core is one of these
/// variants; adapters translate storage failures into them where a rule is
/// enforced by a constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("User already holds an active reservation")]
    ExistingReservation,

    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    #[error("No credit card attached")]
    NoCreditCard,

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("User holds no active reservation")]
    NoReservation,

    #[error("Car not found: {0}")]
    CarNotFound(CarId),

    #[error("Reservation is for package {reserved}, car belongs to {car_package}")]
    PackageMismatch {
        reserved: String,
        car_package: String,
    },

    #[error("Car {0} is not available")]
    CarUnavailable(CarId),

    #[error("A credit card with this number already exists")]
    DuplicateCard,

    #[error("A credit card is already attached to this user")]
    CardAlreadyAttached,

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl DomainError {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::ExistingReservation => "existing_reservation",
            DomainError::UnknownPackage(_) => "unknown_package",
            DomainError::NoCreditCard => "no_credit_card",
            DomainError::InsufficientFunds { .. } => "insufficient_funds",
            DomainError::NoReservation => "no_reservation",
            DomainError::CarNotFound(_) => "car_not_found",
            DomainError::PackageMismatch { .. } => "package_mismatch",
            DomainError::CarUnavailable(_) => "car_unavailable",
            DomainError::DuplicateCard => "duplicate_card",
            DomainError::CardAlreadyAttached => "card_already_attached",
            DomainError::UsernameTaken(_) => "username_taken",
            DomainError::InvalidCredentials => "invalid_credentials",
            DomainError::Validation(_) => "validation",
        }
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Rejected(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::Rejected(e),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::Conflict(e),
        }
    }
}
