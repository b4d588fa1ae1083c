//! Application services.
//!
//! Orchestrate domain operations through the repository ports. Contain NO
//! infrastructure logic; every state change happens inside one repository
//! call so the adapter can make it atomic.

mod account;
mod catalog;
mod delivery;
mod order;
mod payment;

pub use account::AccountService;
pub use catalog::{CatalogService, ImportSummary};
pub use delivery::DeliveryService;
pub use order::OrderService;
pub use payment::PaymentService;

use rental_types::{AppError, RepoError};

/// Converts a repository failure into an application error, logging it on
/// the way: business rejections at `warn`, storage failures at `error`.
pub(crate) fn reject(operation: &'static str, err: RepoError) -> AppError {
    match &err {
        RepoError::Domain(e) => tracing::warn!(operation, kind = e.kind(), "{}", e),
        RepoError::NotFound | RepoError::Conflict(_) => tracing::warn!(operation, "{}", err),
        RepoError::Database(_) | RepoError::Transaction(_) => {
            tracing::error!(operation, "{}", err)
        }
    }
    err.into()
}
