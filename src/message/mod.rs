//! Bus messages and the signal envelope.
//!
//! [`Message`] is the generic header-plus-body container every message
//! kind shares. [`SignalEnvelope`] narrows it to the SIGNAL kind and is
//! the vehicle a property change travels in; [`PropertiesChanged`] is
//! the standard body layout for such changes.
//!
//! ## Message Types
//!
//! | Type            | Code | Purpose                        |
//! |-----------------|------|--------------------------------|
//! | `MethodCall`    | 1    | Invoke a method                |
//! | `MethodReturn`  | 2    | Method reply                   |
//! | `Error`         | 3    | Method error reply             |
//! | `Signal`        | 4    | One-way broadcast notification |
//!
//! ## Size
//!
//! Header and body together must stay under
//! [`crate::names::MAX_MESSAGE_SIZE`]. `set_body` and the header setters
//! refuse values that would push a message over it, so a message built
//! through them always passes [`Message::check_size`].

mod properties;
mod signal;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{BusError, Result};
use crate::names::check_message_size;
use crate::variant::wire::{align, body_len, signature_end, string_end};
use crate::variant::{path_segments, Variant};

pub use properties::{PropertiesChanged, PROPERTIES_CHANGED, PROPERTIES_INTERFACE};
pub use signal::{SignalEnvelope, SignalView};

/// Fixed header: endianness, type, flags, version, body length, serial
const FIXED_HEADER_LEN: usize = 12;

/// Message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Method invocation
    MethodCall,
    /// Method reply
    MethodReturn,
    /// Error reply
    Error,
    /// Broadcast notification
    Signal,
}

impl MessageType {
    /// Wire code
    pub fn code(self) -> u8 {
        match self {
            MessageType::MethodCall => 1,
            MessageType::MethodReturn => 2,
            MessageType::Error => 3,
            MessageType::Signal => 4,
        }
    }

    /// Kind for a wire code; `None` for 0 and unknown codes
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(MessageType::MethodCall),
            2 => Some(MessageType::MethodReturn),
            3 => Some(MessageType::Error),
            4 => Some(MessageType::Signal),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::MethodCall => "method_call",
            MessageType::MethodReturn => "method_return",
            MessageType::Error => "error",
            MessageType::Signal => "signal",
        };
        f.write_str(s)
    }
}

/// Generic bus message.
///
/// Header fields obey the same rules whether they come from a setter, a
/// constructor or JSON: no embedded NUL, and a path starts with `/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    kind: MessageType,
    serial: u32,
    #[serde(default, deserialize_with = "object_path", skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, deserialize_with = "header_field", skip_serializing_if = "Option::is_none")]
    interface: Option<String>,
    #[serde(default, deserialize_with = "header_field", skip_serializing_if = "Option::is_none")]
    member: Option<String>,
    #[serde(default, deserialize_with = "header_field", skip_serializing_if = "Option::is_none")]
    error_name: Option<String>,
    #[serde(default, deserialize_with = "header_field", skip_serializing_if = "Option::is_none")]
    destination: Option<String>,
    #[serde(default, deserialize_with = "header_field", skip_serializing_if = "Option::is_none")]
    sender: Option<String>,
    #[serde(default)]
    body: Vec<Variant>,
}

/// Header strings are NUL-terminated on the wire
fn acceptable(value: &str) -> bool {
    !value.contains('\0')
}

fn acceptable_path(path: &str) -> bool {
    path.starts_with('/') && acceptable(path)
}

fn header_field<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value {
        Some(v) if !acceptable(&v) => Err(serde::de::Error::custom("header field contains NUL")),
        other => Ok(other),
    }
}

fn object_path<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value {
        Some(p) if !acceptable_path(&p) => Err(serde::de::Error::custom(format!(
            "object path {p:?} must start with '/' and contain no NUL"
        ))),
        other => Ok(other),
    }
}

fn header_field_end(offset: usize, value_len: usize) -> usize {
    // code byte, one-character signature, then the string
    let off = align(offset, 8) + 1;
    string_end(signature_end(off, 1), value_len)
}

impl Message {
    /// Create an empty message of `kind`
    pub fn new(kind: MessageType) -> Self {
        Self {
            kind,
            serial: 0,
            path: None,
            interface: None,
            member: None,
            error_name: None,
            destination: None,
            sender: None,
            body: Vec::new(),
        }
    }

    /// Create a signal message addressed by path, interface and member.
    ///
    /// Each field goes through its setter; a refused one is left unset.
    pub fn signal(path: &str, interface: &str, member: &str) -> Self {
        Self::addressed(MessageType::Signal, path, interface, member)
    }

    /// Create a method call addressed by path, interface and member.
    ///
    /// Each field goes through its setter; a refused one is left unset.
    pub fn method_call(path: &str, interface: &str, member: &str) -> Self {
        Self::addressed(MessageType::MethodCall, path, interface, member)
    }

    fn addressed(kind: MessageType, path: &str, interface: &str, member: &str) -> Self {
        let mut message = Self::new(kind);
        message.set_path(path);
        message.set_interface(interface);
        message.set_member(member);
        message
    }

    /// Message kind
    pub fn kind(&self) -> MessageType {
        self.kind
    }

    /// Serial number
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Set the serial number
    pub fn set_serial(&mut self, serial: u32) {
        self.serial = serial;
    }

    /// Object path
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Set the object path. Refused unless it starts with `/`, or if the
    /// message would exceed the size ceiling.
    pub fn set_path(&mut self, path: &str) -> bool {
        if !acceptable_path(path) {
            tracing::debug!(path, "Refused object path");
            return false;
        }
        self.replace_field(|m| &mut m.path, path)
    }

    /// Whether the path equals `path`
    pub fn has_path(&self, path: &str) -> bool {
        self.path() == Some(path)
    }

    /// Path elements split on `/`; empty for `/` or an unset path.
    ///
    /// Recomputed from the current path on every call.
    pub fn path_decomposed(&self) -> impl Iterator<Item = &str> + '_ {
        path_segments(self.path().unwrap_or_default())
    }

    /// Interface name
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    /// Set the interface name
    pub fn set_interface(&mut self, interface: &str) -> bool {
        self.replace_field(|m| &mut m.interface, interface)
    }

    /// Whether the interface equals `interface`
    pub fn has_interface(&self, interface: &str) -> bool {
        self.interface() == Some(interface)
    }

    /// Member name
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Set the member name
    pub fn set_member(&mut self, member: &str) -> bool {
        self.replace_field(|m| &mut m.member, member)
    }

    /// Whether the member equals `member`
    pub fn has_member(&self, member: &str) -> bool {
        self.member() == Some(member)
    }

    /// Error name
    pub fn error_name(&self) -> Option<&str> {
        self.error_name.as_deref()
    }

    /// Set the error name
    pub fn set_error_name(&mut self, name: &str) -> bool {
        self.replace_field(|m| &mut m.error_name, name)
    }

    /// Destination bus name
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Set the destination bus name
    pub fn set_destination(&mut self, destination: &str) -> bool {
        self.replace_field(|m| &mut m.destination, destination)
    }

    /// Sender bus name
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Set the sender bus name
    pub fn set_sender(&mut self, sender: &str) -> bool {
        self.replace_field(|m| &mut m.sender, sender)
    }

    /// Body arguments
    pub fn body(&self) -> &[Variant] {
        &self.body
    }

    /// Concatenated signature of the body arguments
    pub fn body_signature(&self) -> String {
        self.body.iter().map(Variant::signature).collect()
    }

    /// Replace the body.
    ///
    /// # Errors
    ///
    /// [`BusError::OversizeMessage`] if the message would no longer fit;
    /// the previous body is kept.
    pub fn set_body(&mut self, body: Vec<Variant>) -> Result<()> {
        let previous = std::mem::replace(&mut self.body, body);
        if let Err(err) = check_message_size(self.encoded_len()) {
            self.body = previous;
            tracing::warn!(%err, "Refused message body");
            return Err(err);
        }
        Ok(())
    }

    /// Marshalled length of header and body
    pub fn encoded_len(&self) -> usize {
        let strings = [
            &self.path,
            &self.interface,
            &self.member,
            &self.error_name,
            &self.destination,
            &self.sender,
        ];
        let mut off = FIXED_HEADER_LEN + 4;
        for field in strings.into_iter().flatten() {
            off = header_field_end(off, field.len());
        }

        let sig = self.body_signature();
        if !sig.is_empty() {
            off = signature_end(signature_end(align(off, 8) + 1, 1), sig.len());
        }

        align(off, 8) + body_len(&self.body)
    }

    /// Check the whole message against the size ceiling
    pub fn check_size(&self) -> Result<()> {
        check_message_size(self.encoded_len())
    }

    /// Store a header field, keeping the old one if `value` has a NUL or
    /// would push the message over the size ceiling
    fn replace_field(&mut self, field: fn(&mut Self) -> &mut Option<String>, value: &str) -> bool {
        if !acceptable(value) {
            tracing::debug!(value, "Refused header field");
            return false;
        }
        let previous = field(self).replace(value.to_string());
        if let Err(err) = self.check_size() {
            *field(self) = previous;
            tracing::warn!(%err, "Refused header field");
            return false;
        }
        true
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}


/// Fail with [`BusError::WrongMessageKind`] unless `message` is a signal
pub(crate) fn ensure_signal(message: &Message) -> Result<()> {
    if message.kind() == MessageType::Signal {
        Ok(())
    } else {
        tracing::warn!(kind = %message.kind(), "Refused non-signal message");
        Err(BusError::WrongMessageKind {
            expected: MessageType::Signal,
            actual: message.kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::MAX_MESSAGE_SIZE;

    #[test]
    fn test_type_codes() {
        for kind in [
            MessageType::MethodCall,
            MessageType::MethodReturn,
            MessageType::Error,
            MessageType::Signal,
        ] {
            assert_eq!(MessageType::from_code(kind.code()), Some(kind));
        }
        assert_eq!(MessageType::from_code(0), None);
        assert_eq!(MessageType::from_code(5), None);
    }

    #[test]
    fn test_setters() {
        let mut msg = Message::new(MessageType::MethodCall);
        assert!(msg.set_path("/org/example"));
        assert!(!msg.set_path("org/example"));
        assert!(!msg.set_member("Get\0"));
        assert!(msg.set_member("Get"));
        assert!(msg.set_interface("org.freedesktop.DBus.Properties"));
        assert!(msg.set_destination(":1.7"));

        assert_eq!(msg.path(), Some("/org/example"));
        assert!(msg.has_member("Get"));
        assert!(msg.has_interface("org.freedesktop.DBus.Properties"));
        assert_eq!(msg.destination(), Some(":1.7"));
    }

    #[test]
    fn test_setters_do_not_apply_name_grammar() {
        let mut msg = Message::new(MessageType::Signal);
        assert!(msg.set_interface("not a valid interface"));
        assert!(msg.set_member("9.bad"));
    }

    #[test]
    fn test_path_decomposed() {
        let mut msg = Message::new(MessageType::Signal);
        assert_eq!(msg.path_decomposed().count(), 0);

        msg.set_path("/a/b/c");
        assert_eq!(msg.path_decomposed().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        // restartable
        assert_eq!(msg.path_decomposed().count(), 3);

        msg.set_path("/");
        assert_eq!(msg.path_decomposed().count(), 0);
    }

    #[test]
    fn test_encoded_len_empty() {
        assert_eq!(Message::new(MessageType::Signal).encoded_len(), 16);
    }

    #[test]
    fn test_set_body_rejects_oversize() {
        let mut msg = Message::signal("/a", "org.example.Iface", "Changed");
        msg.set_body(vec![Variant::from(1u32)]).unwrap();

        let huge = Variant::Str("x".repeat(MAX_MESSAGE_SIZE));
        assert!(matches!(
            msg.set_body(vec![huge]),
            Err(BusError::OversizeMessage { .. })
        ));
        assert_eq!(msg.body(), &[Variant::UInt32(1)]);
    }

    #[test]
    fn test_constructors_refuse_relative_path() {
        let msg = Message::signal("relative", "org.example.Iface", "Changed");
        assert_eq!(msg.path(), None);
        assert!(msg.has_member("Changed"));

        let call = Message::method_call("/ok", "org.example.Iface", "Get\0");
        assert_eq!(call.path(), Some("/ok"));
        assert_eq!(call.member(), None);
    }

    #[test]
    fn test_from_json_applies_header_rules() {
        let relative = r#"{"kind":"signal","serial":1,"path":"relative","member":"Changed"}"#;
        assert!(matches!(Message::from_json(relative), Err(BusError::Json(_))));

        let nul = r#"{"kind":"signal","serial":1,"path":"/a","member":"Chan\u0000ged"}"#;
        assert!(matches!(Message::from_json(nul), Err(BusError::Json(_))));

        let minimal = r#"{"kind":"signal","serial":1}"#;
        let msg = Message::from_json(minimal).unwrap();
        assert_eq!(msg.path(), None);
        assert!(msg.body().is_empty());
    }

    #[test]
    fn test_header_setter_respects_size_ceiling() {
        let mut msg = Message::signal("/a", "org.example.Iface", "Changed");
        let room = MAX_MESSAGE_SIZE - msg.encoded_len() - 128;
        msg.set_body(vec![Variant::Str("x".repeat(room))]).unwrap();
        msg.check_size().unwrap();

        let long_path = format!("/{}", "p".repeat(400));
        assert!(!msg.set_path(&long_path));
        assert_eq!(msg.path(), Some("/a"));
        assert!(!msg.set_sender(&"s".repeat(400)));
        assert_eq!(msg.sender(), None);
        assert!(msg.set_sender(":1.7"));
        msg.check_size().unwrap();
    }

    #[test]
    fn test_json_roundtrip() {
        let mut msg = Message::signal("/a", "org.example.Iface", "Changed");
        msg.set_body(vec![Variant::from("hi")]).unwrap();
        let back = Message::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(back, msg);
    }
}
