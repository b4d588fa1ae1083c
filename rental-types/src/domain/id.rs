//! Integer identifiers assigned by the store.

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw database key.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a User.
    UserId
);
entity_id!(
    /// Unique identifier for a CreditCard.
    CreditCardId
);
entity_id!(
    /// Unique identifier for a Package.
    PackageId
);
entity_id!(
    /// Unique identifier for a Car.
    CarId
);
entity_id!(
    /// Unique identifier for a Reservation.
    ReservationId
);
entity_id!(
    /// Unique identifier for a RentalRecord.
    RentalId
);
entity_id!(SessionId);
