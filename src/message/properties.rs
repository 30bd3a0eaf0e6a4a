//! The standard `PropertiesChanged` signal.
//!
//! Body layout `sa{sv}as`: interface name, changed properties with their
//! new values, and names of properties that changed without a value.

use std::collections::BTreeMap;

use super::SignalEnvelope;
use crate::error::{BusError, Result};
use crate::names::{InterfaceName, MemberName};
use crate::property::{ChangeKind, PropertyChange};
use crate::variant::{ObjectPath, Signature, Variant, VariantArray};

/// Interface carrying the signal
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Signal member name
pub const PROPERTIES_CHANGED: &str = "PropertiesChanged";

const BODY_SIGNATURE: &str = "sa{sv}as";

/// One `PropertiesChanged` emission, possibly batching several changes
#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesChanged {
    /// Interface whose properties changed
    pub interface: InterfaceName,
    /// Properties sent with their new value
    pub changed: BTreeMap<String, Variant>,
    /// Properties sent as invalidated
    pub invalidated: Vec<String>,
}

impl PropertiesChanged {
    /// Empty emission for `interface`
    pub fn new(interface: InterfaceName) -> Self {
        Self {
            interface,
            changed: BTreeMap::new(),
            invalidated: Vec::new(),
        }
    }

    /// Emission carrying a single change
    pub fn from_change(change: &PropertyChange) -> Self {
        let mut batch = Self::new(change.interface.clone());
        batch.insert(change);
        batch
    }

    /// Add a change to this batch.
    ///
    /// # Errors
    ///
    /// [`BusError::InvalidField`] if the change belongs to another interface.
    pub fn push(&mut self, change: &PropertyChange) -> Result<()> {
        if change.interface != self.interface {
            return Err(BusError::InvalidField(format!(
                "change for {} batched into {}",
                change.interface, self.interface
            )));
        }
        self.insert(change);
        Ok(())
    }

    fn insert(&mut self, change: &PropertyChange) {
        let name = change.name.as_str();
        match &change.kind {
            ChangeKind::Changed(value) => {
                self.invalidated.retain(|n| n != name);
                self.changed.insert(name.to_string(), value.clone());
            },
            ChangeKind::Invalidated => {
                self.changed.remove(name);
                if !self.invalidated.iter().any(|n| n == name) {
                    self.invalidated.push(name.to_string());
                }
            },
        }
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.invalidated.is_empty()
    }

    /// Build the signal emitted from the object at `path`.
    ///
    /// # Errors
    ///
    /// [`BusError::OversizeMessage`] if the body does not fit.
    pub fn to_envelope(&self, path: &ObjectPath) -> Result<SignalEnvelope> {
        let mut envelope =
            SignalEnvelope::new(path.as_str(), PROPERTIES_INTERFACE, PROPERTIES_CHANGED);
        envelope.set_body(vec![
            Variant::Str(self.interface.to_string()),
            Variant::Dict(self.changed.clone()),
            Variant::Array(VariantArray::from_trusted(
                Signature::from_static("s"),
                self.invalidated.iter().cloned().map(Variant::Str).collect(),
            )),
        ])?;
        Ok(envelope)
    }

    /// Parse a received `PropertiesChanged` signal.
    ///
    /// # Errors
    ///
    /// [`BusError::InvalidField`] if the envelope is another signal,
    /// [`BusError::TypeMismatch`] if its body is not `sa{sv}as`, or
    /// [`BusError::InvalidName`] if the interface name is malformed.
    pub fn from_envelope(envelope: &SignalEnvelope) -> Result<Self> {
        if !envelope.is_signal(PROPERTIES_INTERFACE, PROPERTIES_CHANGED) {
            return Err(BusError::InvalidField(format!(
                "expected {PROPERTIES_INTERFACE}.{PROPERTIES_CHANGED}, got {}.{}",
                envelope.interface().unwrap_or_default(),
                envelope.member().unwrap_or_default()
            )));
        }

        match envelope.body() {
            [Variant::Str(interface), Variant::Dict(changed), invalidated @ Variant::Array(_)] => {
                Ok(Self {
                    interface: InterfaceName::try_new(interface.as_str())?,
                    changed: changed.clone(),
                    invalidated: invalidated.get::<Vec<String>>()?,
                })
            },
            _ => Err(BusError::mismatch(BODY_SIGNATURE, envelope.body_signature())),
        }
    }

    /// Split into individual changes, validating each property name
    pub fn into_changes(self) -> Result<Vec<PropertyChange>> {
        let mut changes = Vec::with_capacity(self.changed.len() + self.invalidated.len());
        for (name, value) in self.changed {
            changes.push(PropertyChange::changed(
                self.interface.clone(),
                MemberName::try_new(name)?,
                value,
            ));
        }
        for name in self.invalidated {
            changes.push(PropertyChange::invalidated(
                self.interface.clone(),
                MemberName::try_new(name)?,
            ));
        }
        Ok(changes)
    }
}
