//! Validated name newtypes.
//!
//! # Validation
//!
//! Each type is only constructible through `try_new()` (or the `TryFrom`
//! impls, or deserialization), all of which run the matching grammar
//! from [`super`]. Holding a value is proof the name is valid.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NameKind;
use crate::error::{BusError, Result};

macro_rules! validated_name {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a validated name.
            ///
            /// # Errors
            ///
            /// Returns [`BusError::InvalidName`] if the grammar rejects it.
            pub fn try_new(name: impl Into<String>) -> Result<Self> {
                let name = name.into();
                $kind.check(&name)?;
                Ok(Self(name))
            }

            /// Get the name as a string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the inner string
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = BusError;

            fn try_from(name: String) -> Result<Self> {
                Self::try_new(name)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = BusError;

            fn try_from(name: &str) -> Result<Self> {
                Self::try_new(name)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

validated_name!(
    /// Bus name: a well-known service name or a `:`-prefixed unique name.
    BusName,
    NameKind::Bus
);

validated_name!(
    /// Interface name, e.g. `org.freedesktop.DBus.Properties`.
    InterfaceName,
    NameKind::Interface
);

validated_name!(
    /// Member name of a method, signal or property.
    MemberName,
    NameKind::Member
);

validated_name!(
    /// Error name, e.g. `org.freedesktop.DBus.Error.Failed`.
    ErrorName,
    NameKind::Error
);

impl BusName {
    /// True for unique connection names (leading `:`)
    pub fn is_unique(&self) -> bool {
        self.0.starts_with(':')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new() {
        let name = InterfaceName::try_new("org.example.Player").unwrap();
        assert_eq!(name.as_str(), "org.example.Player");
        assert_eq!(name.to_string(), "org.example.Player");
        assert_eq!(name, "org.example.Player");

        assert!(MemberName::try_new("Volume").is_ok());
        assert!(MemberName::try_new("1Volume").is_err());
        assert!(ErrorName::try_new("org.example.Error.Busy").is_ok());
    }

    #[test]
    fn test_unique_bus_name() {
        assert!(BusName::try_new(":1.54").unwrap().is_unique());
        assert!(!BusName::try_new("org.example.Player").unwrap().is_unique());
    }

    #[test]
    fn test_invalid_name_error_carries_input() {
        match BusName::try_from(".org.example") {
            Err(BusError::InvalidName { kind, name }) => {
                assert_eq!(kind, NameKind::Bus);
                assert_eq!(name, ".org.example");
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_serde_validates() {
        let name: InterfaceName = serde_json::from_str("\"org.example.Player\"").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"org.example.Player\"");

        assert!(serde_json::from_str::<InterfaceName>("\"org.2example\"").is_err());
    }
}
