//! Strongly typed UUID identifiers for catalogue and lending entities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a catalogue [`crate::domain::Element`].
    ElementId
);
define_entity_id!(
    /// Identifier of a [`crate::domain::Category`].
    CategoryId
);
define_entity_id!(
    /// Identifier of a [`crate::domain::Tag`].
    TagId
);
define_entity_id!(
    /// Identifier of an [`crate::domain::Author`].
    AuthorId
);
define_entity_id!(
    /// Identifier of a [`crate::domain::Reservation`].
    ReservationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id: ElementId = raw.parse().expect("valid uuid");
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn serialises_transparently() {
        let id = CategoryId::from_uuid(Uuid::nil());
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::json!(Uuid::nil().to_string()));
    }
}
