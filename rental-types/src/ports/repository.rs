//! Repository port traits.
//!
//! These are the primary ports in our hexagonal architecture. Adapters
//! (Postgres, SQLite, in-memory) implement them.

use crate::domain::{
    Car, CarId, CreditCard, Money, NewUser, Package, Pickup, RentalRecord, Reservation, Session,
    User, UserId,
};
use crate::dto::{
    AttachCardRequest, CarQuery, CreateCarRequest, CreatePackageRequest, Page, SubmitOrderRequest,
};
use crate::error::RepoError;

/// Users and login sessions. Acts as the identity resolver.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Inserts a user. A taken username is `DomainError::UsernameTaken`.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Stores a session for an already hashed token.
    async fn create_session(&self, user_id: UserId, token_hash: &str)
    -> Result<Session, RepoError>;

    /// Resolves the user owning a session token hash.
    async fn find_session_user(&self, token_hash: &str) -> Result<Option<User>, RepoError>;

    /// Deletes a session. Returns false if it did not exist.
    async fn delete_session(&self, token_hash: &str) -> Result<bool, RepoError>;
}

/// Packages and cars.
#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync + 'static {
    async fn create_package(&self, req: CreatePackageRequest) -> Result<Package, RepoError>;

    async fn find_package(&self, name: &str) -> Result<Option<Package>, RepoError>;

    /// All packages ordered by price, then name.
    async fn list_packages(&self) -> Result<Vec<Package>, RepoError>;

    /// Inserts an available car. An unknown package is `DomainError::UnknownPackage`.
    async fn create_car(&self, req: CreateCarRequest) -> Result<Car, RepoError>;

    async fn get_car(&self, id: CarId) -> Result<Option<Car>, RepoError>;

    async fn list_cars(&self, query: &CarQuery) -> Result<Page<Car>, RepoError>;
}

/// Stored-value credit cards.
#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    /// Attaches a card with a zero balance.
    ///
    /// A number already used by any user is `DomainError::DuplicateCard`;
    /// a user who already has a card gets `DomainError::CardAlreadyAttached`.
    async fn attach_card(
        &self,
        user_id: UserId,
        req: AttachCardRequest,
    ) -> Result<CreditCard, RepoError>;

    async fn get_card(&self, user_id: UserId) -> Result<Option<CreditCard>, RepoError>;

    /// Atomically adds `amount` to the user's card balance.
    async fn add_funds(&self, user_id: UserId, amount: Money) -> Result<CreditCard, RepoError>;

    /// Removes the user's card. Returns false if there was none.
    async fn remove_card(&self, user_id: UserId) -> Result<bool, RepoError>;
}

/// The order and pickup transactions.
///
/// Both mutating operations MUST run in a single database transaction and
/// leave no trace when they fail.
#[async_trait::async_trait]
pub trait RentalRepository: Send + Sync + 'static {
    /// Debits the card and issues a reservation.
    ///
    /// Checks, in order: existing reservation, package, card, funds.
    async fn submit_order(
        &self,
        user_id: UserId,
        req: &SubmitOrderRequest,
    ) -> Result<Reservation, RepoError>;

    async fn get_reservation(&self, user_id: UserId) -> Result<Option<Reservation>, RepoError>;

    /// Consumes the user's reservation against a car.
    ///
    /// Checks, in order: reservation, car, package match, availability.
    async fn pick_up(&self, user_id: UserId, car_id: CarId) -> Result<Pickup, RepoError>;

    /// Rental history of a user, newest first.
    async fn list_rentals(&self, user_id: UserId) -> Result<Vec<RentalRecord>, RepoError>;
}

/// Everything the application needs from storage.
pub trait Repository:
    UserRepository + CatalogRepository + PaymentRepository + RentalRepository
{
}

impl<T> Repository for T where
    T: UserRepository + CatalogRepository + PaymentRepository + RentalRepository
{
}
