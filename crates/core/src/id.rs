//! Strongly-typed identifiers for catalog and supply records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Declares a UUID-backed identifier with serde, parsing and conversions.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $t:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Fresh time-ordered (UUIDv7) identifier. Records loaded from a
            /// dataset keep the ids they were stored with.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $t {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$t> for Uuid {
            fn from(id: $t) -> Self {
                id.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::try_parse(s.trim())
                    .map(Self)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {e}", stringify!($t))))
            }
        }
    };
}

uuid_id! {
    /// Identifier of a catalog product.
    ProductId
}

uuid_id! {
    /// Identifier of a sellable product variant (the unit that carries stock).
    VariantId
}

uuid_id! {
    /// Identifier of a supplier.
    SupplierId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_output() {
        let id = VariantId::new();
        let parsed: VariantId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_error_names_the_identifier() {
        let DomainError::InvalidId(msg) = "not-a-uuid".parse::<ProductId>().unwrap_err();
        assert!(msg.starts_with("ProductId"));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let id = ProductId::new();
        let parsed: ProductId = format!(" {id}\n").parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn uuid_round_trips_through_conversions() {
        let uuid = Uuid::nil();
        let id = SupplierId::from(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(Uuid::from(id), uuid);
    }
}
