//! Properties and their change notification.
//!
//! A property is identified by its owning interface and its own member
//! name, and carries a [`NotificationStrategy`] fixed at creation.
//!
//! ## Roles
//!
//! | Role  | Created by                    | `set_value`                                  |
//! |-------|-------------------------------|----------------------------------------------|
//! | Owner | [`PropertyCore::create`]      | stores, notifies, emits per strategy         |
//! | Proxy | [`PropertyCore::create_proxy`]| remote `Set` via [`PropertyTransport`]       |
//!
//! ## Notification
//!
//! Every core owns two signals:
//!
//! - `signal_generic_property_changed()`: in-process observers, called
//!   with the new value whenever the stored value changes, whatever the
//!   strategy.
//! - `signal_wire_change()`: owner side only. Carries the [`PropertyChange`]
//!   an external dispatcher turns into a `PropertiesChanged` signal.
//!
//! | Strategy            | Wire event                 |
//! |---------------------|----------------------------|
//! | `EmitsValue`        | `ChangeKind::Changed(v)`   |
//! | `EmitsInvalidation` | `ChangeKind::Invalidated`  |
//! | `Silent`            | none                       |
//!
//! # Example
//!
//! ```rust
//! use dbus_props::property::{NotificationStrategy, TypedProperty};
//!
//! let volume = TypedProperty::<u32>::create(
//!     "org.example.Player",
//!     "Volume",
//!     NotificationStrategy::EmitsValue,
//! )
//! .unwrap();
//!
//! volume.set_value(11).unwrap();
//! assert_eq!(volume.value().unwrap(), 11);
//! ```

mod base;
mod typed;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::names::{InterfaceName, MemberName};
use crate::variant::Variant;

pub use base::PropertyCore;
pub use typed::{TypedProperty, TypedSignal};

/// What a property change broadcasts on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStrategy {
    /// Broadcast the new value
    #[default]
    EmitsValue,
    /// Broadcast an invalidation marker only
    EmitsInvalidation,
    /// Broadcast nothing; local observers are still notified
    Silent,
}

impl NotificationStrategy {
    /// Whether changes reach the wire at all
    pub fn is_wire_visible(self) -> bool {
        !matches!(self, NotificationStrategy::Silent)
    }

    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EmitsValue => "emits_value",
            Self::EmitsInvalidation => "emits_invalidation",
            Self::Silent => "silent",
        }
    }
}

impl std::fmt::Display for NotificationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for NotificationStrategy {
    type Err = String;

    // Accepts the EmitsChangedSignal annotation values too
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "emits_value" | "value" | "true" => Ok(Self::EmitsValue),
            "emits_invalidation" | "invalidation" | "invalidates" => Ok(Self::EmitsInvalidation),
            "silent" | "false" | "none" => Ok(Self::Silent),
            _ => Err(format!("Unknown notification strategy: {}", s)),
        }
    }
}

/// Property access as declared by the remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Readable only; writes are no-ops
    Read,
    /// Writable only
    Write,
    /// Readable and writable
    #[default]
    ReadWrite,
}

impl Access {
    /// Whether a `Set` may be attempted
    pub fn is_writable(self) -> bool {
        !matches!(self, Access::Read)
    }
}

/// Result of a successful `set_value`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Owner side: value stored and notifications dispatched
    Updated,
    /// Owner side: value equal to the stored one, nothing emitted
    Unchanged,
    /// Proxy side: the remote `Set` was accepted
    RemoteWritten,
    /// Proxy side: property is read-only, nothing attempted
    ReadOnlyNoop,
}

/// Payload of a wire change event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// New value
    Changed(Variant),
    /// Value changed, but is not sent
    Invalidated,
}

/// A property change as seen on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    /// Interface owning the property
    pub interface: InterfaceName,
    /// Property name
    pub name: MemberName,
    /// What changed
    pub kind: ChangeKind,
}

impl PropertyChange {
    /// Change carrying a new value
    pub fn changed(interface: InterfaceName, name: MemberName, value: Variant) -> Self {
        Self {
            interface,
            name,
            kind: ChangeKind::Changed(value),
        }
    }

    /// Invalidation-only change
    pub fn invalidated(interface: InterfaceName, name: MemberName) -> Self {
        Self {
            interface,
            name,
            kind: ChangeKind::Invalidated,
        }
    }

    /// New value, if the change carries one
    pub fn value(&self) -> Option<&Variant> {
        match &self.kind {
            ChangeKind::Changed(v) => Some(v),
            ChangeKind::Invalidated => None,
        }
    }
}

/// Remote side of a proxy property.
///
/// Implemented by the bus transport. Timeouts and cancellation are the
/// implementation's business; a failure is reported as an error and
/// handed back to the caller unchanged.
pub trait PropertyTransport: Send + Sync {
    /// Invoke `org.freedesktop.DBus.Properties.Set` on the remote object
    fn set_property(&self, interface: &InterfaceName, name: &MemberName, value: &Variant) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_wire_visibility() {
        assert!(NotificationStrategy::EmitsValue.is_wire_visible());
        assert!(NotificationStrategy::EmitsInvalidation.is_wire_visible());
        assert!(!NotificationStrategy::Silent.is_wire_visible());
    }

    #[test]
    fn test_strategy_from_str() {
        use std::str::FromStr;

        assert_eq!(
            NotificationStrategy::from_str("invalidates").unwrap(),
            NotificationStrategy::EmitsInvalidation
        );
        assert_eq!(
            NotificationStrategy::from_str("TRUE").unwrap(),
            NotificationStrategy::EmitsValue
        );
        assert_eq!(
            NotificationStrategy::from_str("silent").unwrap(),
            NotificationStrategy::Silent
        );
        assert!(NotificationStrategy::from_str("loud").is_err());
    }

    #[test]
    fn test_access() {
        assert!(!Access::Read.is_writable());
        assert!(Access::Write.is_writable());
        assert!(Access::ReadWrite.is_writable());
    }

    #[test]
    fn test_strategy_serde() {
        let s: NotificationStrategy = serde_json::from_str("\"emits_invalidation\"").unwrap();
        assert_eq!(s, NotificationStrategy::EmitsInvalidation);
    }

    #[test]
    fn test_change_value() {
        let iface = InterfaceName::try_new("org.example.Player").unwrap();
        let name = MemberName::try_new("Volume").unwrap();
        let change = PropertyChange::changed(iface.clone(), name.clone(), 3u32.into());
        assert_eq!(change.value(), Some(&Variant::UInt32(3)));
        assert_eq!(PropertyChange::invalidated(iface, name).value(), None);
    }
}
