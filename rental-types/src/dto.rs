//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{MAX_RENTAL_HOURS, Money, UserId};
use crate::error::DomainError;

fn invalid(msg: &str) -> DomainError {
    DomainError::Validation(msg.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// User DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical form of a username, as stored and as looked up at login.
pub fn normalize_username(username: &str) -> &str {
    username.trim()
}

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// At least 8 characters
    #[schema(example = "correct-horse")]
    pub password: String,
    #[schema(example = "+48123456789")]
    pub phone: String,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if normalize_username(&self.username).is_empty() {
            return Err(invalid("username cannot be empty"));
        }
        if !self.email.contains('@') {
            return Err(invalid("email must contain '@'"));
        }
        if self.password.chars().count() < 8 {
            return Err(invalid("password must be at least 8 characters"));
        }
        Ok(())
    }
}

/// Request to log in and obtain a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "correct-horse")]
    pub password: String,
}

/// Response after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token, shown only once
    #[schema(example = "rt_abc123xyz...")]
    pub token: String,
    pub user_id: UserId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Credit card DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to attach a credit card to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachCardRequest {
    #[schema(example = "4111111111111111")]
    pub number: String,
    #[schema(example = 12)]
    pub expiry_month: i32,
    #[schema(example = 2030)]
    pub expiry_year: i32,
    #[schema(example = "123")]
    pub cvv: String,
}

impl AttachCardRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.number.is_empty() || !self.number.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("card number must consist of digits"));
        }
        if !(1..=12).contains(&self.expiry_month) {
            return Err(invalid("expiry month must be between 1 and 12"));
        }
        if !(3..=4).contains(&self.cvv.len()) || !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("cvv must be 3 or 4 digits"));
        }
        Ok(())
    }
}

/// Request to top up the caller's card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddFundsRequest {
    /// Amount to add in minor units
    #[schema(example = 100000)]
    pub amount: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Order DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to reserve and pay for a package.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitOrderRequest {
    /// Package name
    #[schema(example = "Ordinary")]
    pub package: String,
    /// Rental length, 1 to 720 hours
    #[schema(example = 10)]
    pub hours: i32,
}

impl SubmitOrderRequest {
    /// Enforces the accepted rental length.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(1..=MAX_RENTAL_HOURS).contains(&self.hours) {
            return Err(DomainError::Validation(format!(
                "hours must be between 1 and {}",
                MAX_RENTAL_HOURS
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a package.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePackageRequest {
    #[schema(example = "Ordinary")]
    pub name: String,
    pub price_per_hour: Money,
}

/// Request to create a car.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCarRequest {
    #[schema(example = "WX 12345")]
    pub registration_number: String,
    #[schema(example = "Toyota")]
    pub brand: String,
    #[schema(example = "Corolla")]
    pub model: String,
    /// Name of an existing package
    #[schema(example = "Ordinary")]
    pub package: String,
}

/// Catalog contents imported at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub packages: Vec<CreatePackageRequest>,
    #[serde(default)]
    pub cars: Vec<CreateCarRequest>,
}

/// Column used to order car listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CarSort {
    #[default]
    Id,
    Brand,
    Model,
    Package,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Pagination, sorting and filters for car listings.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarQuery {
    /// Zero-based page number
    #[serde(default)]
    pub page: u32,
    /// Items per page, 1 to 100
    #[serde(default = "default_page_size")]
    pub size: u32,
    #[serde(default)]
    #[param(inline)]
    pub sort: CarSort,
    #[serde(default)]
    #[param(inline)]
    pub direction: SortDirection,
    /// Only cars with this availability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// Only cars of this package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl Default for CarQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: CarSort::default(),
            direction: SortDirection::default(),
            available: None,
            package: None,
        }
    }
}

impl CarQuery {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.size) {
            return Err(DomainError::Validation(format!(
                "page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    /// Total number of matching items across all pages
    pub total: i64,
}
