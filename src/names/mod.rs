//! Name grammar for bus, interface, member and error names.
//!
//! All names are ASCII text over the alphabet `[A-Za-z0-9_]`, at most
//! 255 bytes long. Dotted names (bus, interface, error) are split into
//! elements on `.`; every element must be non-empty and at least two
//! elements are required.
//!
//! | Name      | Dotted | Digit-leading element | `:` prefix        |
//! |-----------|--------|-----------------------|-------------------|
//! | Bus       | yes    | only for unique names | unique connection |
//! | Interface | yes    | never                 | not recognized    |
//! | Error     | yes    | never                 | not recognized    |
//! | Member    | no     | never                 | not recognized    |
//!
//! The validators are total: malformed input is simply not accepted.
//! Use the newtypes in this module ([`BusName`], [`InterfaceName`], ...)
//! when a rejected name should surface as [`BusError::InvalidName`].
//!
//! # Example
//!
//! ```rust
//! use dbus_props::names::{validate_bus_name, validate_interface_name};
//!
//! assert!(validate_bus_name("org.freedesktop.DBus"));
//! assert!(validate_bus_name(":1.54"));
//! assert!(!validate_bus_name(".org.freedesktop"));
//! assert!(!validate_interface_name("org.2freedesktop"));
//! ```

mod types;

use std::fmt;


use crate::error::{BusError, Result};

pub use types::{BusName, ErrorName, InterfaceName, MemberName};

/// Longest accepted name, in bytes
pub const MAX_NAME_LENGTH: usize = 255;

/// Message size ceiling (128 MiB); a message must be strictly smaller
pub const MAX_MESSAGE_SIZE: usize = 1 << 27;

/// Which grammar a name is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// Bus (connection or service) name
    Bus,
    /// Interface name
    Interface,
    /// Member (method, signal, property) name
    Member,
    /// Error name
    Error,
}

impl NameKind {
    /// Run this kind's validator over `name`
    pub fn validate(self, name: &str) -> bool {
        match self {
            NameKind::Bus => validate_bus_name(name),
            NameKind::Interface => validate_interface_name(name),
            NameKind::Member => validate_member_name(name),
            NameKind::Error => validate_error_name(name),
        }
    }

    /// Validate `name`, turning a rejection into [`BusError::InvalidName`]
    pub fn check(self, name: &str) -> Result<()> {
        if self.validate(name) {
            Ok(())
        } else {
            tracing::debug!(kind = %self, name, "Rejected name");
            Err(BusError::InvalidName {
                kind: self,
                name: name.to_string(),
            })
        }
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NameKind::Bus => "bus",
            NameKind::Interface => "interface",
            NameKind::Member => "member",
            NameKind::Error => "error",
        };
        f.write_str(s)
    }
}

/// Allowed element alphabet: `[A-Za-z0-9_]`
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn within_length(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LENGTH
}

/// Scan `.`-separated elements. Each must be non-empty and drawn from
/// the name alphabet; a leading digit is rejected unless `digit_lead` is set.
fn valid_elements(body: &str, digit_lead: bool) -> bool {
    let mut count = 0usize;

    for element in body.split('.') {
        let bytes = element.as_bytes();
        let Some(&first) = bytes.first() else {
            return false;
        };
        if !digit_lead && first.is_ascii_digit() {
            return false;
        }
        if !bytes.iter().all(|&b| is_name_char(b)) {
            return false;
        }
        count += 1;
    }

    count >= 2
}

/// Check a bus name.
///
/// A leading `:` marks a unique connection name, whose elements may
/// start with a digit. Well-known names may not.
pub fn validate_bus_name(name: &str) -> bool {
    if !within_length(name) {
        return false;
    }

    match name.strip_prefix(':') {
        Some(unique) => valid_elements(unique, true),
        None => valid_elements(name, false),
    }
}

/// Check an interface name. `:` carries no meaning here.
pub fn validate_interface_name(name: &str) -> bool {
    within_length(name) && valid_elements(name, false)
}

/// Check a member name: a single element, no dots, not digit-leading.
pub fn validate_member_name(name: &str) -> bool {
    if !within_length(name) {
        return false;
    }

    let bytes = name.as_bytes();
    if bytes[0].is_ascii_digit() {
        return false;
    }

    bytes.iter().all(|&b| is_name_char(b))
}

/// Check an error name. Error names share the interface grammar.
pub fn validate_error_name(name: &str) -> bool {
    validate_interface_name(name)
}

/// True iff a message of `len` bytes is under [`MAX_MESSAGE_SIZE`]
pub fn message_is_small_enough(len: usize) -> bool {
    len < MAX_MESSAGE_SIZE
}

/// Reject a message of `len` bytes that does not fit on the wire
pub fn check_message_size(len: usize) -> Result<()> {
    if message_is_small_enough(len) {
        Ok(())
    } else {
        Err(BusError::OversizeMessage {
            size: len,
            max: MAX_MESSAGE_SIZE - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_name_examples() {
        assert!(validate_bus_name("org.freedesktop.DBus"));
        assert!(validate_bus_name("com.example"));
        assert!(validate_bus_name("a_b.C_d9"));
        assert!(!validate_bus_name(".org.freedesktop"));
        assert!(!validate_bus_name("org"));
        assert!(!validate_bus_name(""));
        assert!(!validate_bus_name("org..freedesktop"));
        assert!(!validate_bus_name("org.freedesktop."));
        assert!(!validate_bus_name("org.free-desktop"));
        assert!(!validate_bus_name("org.freedesktop.2DBus"));
        assert!(!validate_bus_name("1org.freedesktop"));
    }

    #[test]
    fn test_unique_bus_names() {
        assert!(validate_bus_name(":1.54"));
        assert!(validate_bus_name(":1.2.3"));
        assert!(validate_bus_name(":abc.def"));
        assert!(!validate_bus_name(":"));
        assert!(!validate_bus_name(":1"));
        assert!(!validate_bus_name(":.1"));
        assert!(!validate_bus_name("::1.2"));
    }

    #[test]
    fn test_bus_name_length() {
        let ok = format!("a.{}", "b".repeat(MAX_NAME_LENGTH - 2));
        assert_eq!(ok.len(), 255);
        assert!(validate_bus_name(&ok));

        let long = format!("a.{}", "b".repeat(MAX_NAME_LENGTH - 1));
        assert!(!validate_bus_name(&long));
    }

    #[test]
    fn test_interface_names() {
        assert!(validate_interface_name("org.freedesktop.DBus"));
        assert!(validate_interface_name("org.freedesktop.DBus.Properties"));
        assert!(!validate_interface_name("org.2freedesktop"));
        assert!(!validate_interface_name(":1.54"));
        assert!(!validate_interface_name(":org.freedesktop"));
        assert!(!validate_interface_name("org"));
        assert!(!validate_interface_name(".org.freedesktop"));
    }

    #[test]
    fn test_member_names() {
        assert!(validate_member_name("PropertiesChanged"));
        assert!(validate_member_name("get_value2"));
        assert!(validate_member_name("_private"));
        assert!(!validate_member_name(""));
        assert!(!validate_member_name("Get.Value"));
        assert!(!validate_member_name("Get-Value"));
        assert!(!validate_member_name(&"m".repeat(256)));
        assert!(validate_member_name(&"m".repeat(255)));
    }

    #[test]
    fn test_member_name_rejects_digit_lead() {
        // Regression: the first-character check must reject a leading
        // digit and accept everything else in the alphabet.
        assert!(!validate_member_name("9Lives"));
        assert!(!validate_member_name("0"));
        assert!(validate_member_name("Lives9"));
    }

    #[test]
    fn test_error_names_follow_interface_grammar() {
        for name in ["org.freedesktop.DBus.Error.Failed", "a.b", "a", "a.1b", ":a.b"] {
            assert_eq!(validate_error_name(name), validate_interface_name(name));
        }
    }

    #[test]
    fn test_message_size_boundary() {
        assert!(message_is_small_enough(0));
        assert!(message_is_small_enough(134_217_727));
        assert!(!message_is_small_enough(134_217_728));
        assert!(check_message_size(1024).is_ok());
        assert!(matches!(
            check_message_size(MAX_MESSAGE_SIZE),
            Err(BusError::OversizeMessage { size: 134_217_728, .. })
        ));
    }

    #[test]
    fn test_name_kind_check() {
        assert!(NameKind::Member.check("Volume").is_ok());
        let err = NameKind::Interface.check("nodots").unwrap_err();
        assert!(matches!(
            err,
            BusError::InvalidName { kind: NameKind::Interface, .. }
        ));
    }
}
