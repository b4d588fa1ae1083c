//! Domain models for the rental service.

pub mod catalog;
pub mod credit_card;
pub mod id;
pub mod money;
pub mod reservation;
pub mod session;
pub mod user;

pub use catalog::{Car, Package};
pub use credit_card::CreditCard;
pub use id::{CarId, CreditCardId, PackageId, RentalId, ReservationId, SessionId, UserId};
pub use money::Money;
pub use reservation::{MAX_RENTAL_HOURS, NewRental, Pickup, RentalRecord, Reservation};
pub use session::Session;
pub use user::{Caller, NewUser, User};
