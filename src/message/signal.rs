//! Signal-kind message wrappers.
//!
//! Both wrappers can only exist over a message whose kind is SIGNAL.
//! Wrapping anything else fails with [`BusError::WrongMessageKind`];
//! the kind is never coerced.

use std::ops::Deref;

use super::{ensure_signal, Message, MessageType};
use crate::error::{BusError, Result};
use crate::variant::Variant;

/// Owned signal message
#[derive(Debug, Clone)]
pub struct SignalEnvelope {
    message: Message,
}

impl SignalEnvelope {
    /// New signal addressed by path, interface and member
    pub fn new(path: &str, interface: &str, member: &str) -> Self {
        Self {
            message: Message::signal(path, interface, member),
        }
    }

    /// New signal with only the member set
    pub fn with_member(member: &str) -> Self {
        let mut message = Message::new(MessageType::Signal);
        message.set_member(member);
        Self { message }
    }

    /// Borrow a signal message read-only
    pub fn view(message: &Message) -> Result<SignalView<'_>> {
        SignalView::try_from(message)
    }

    /// Set the object path; false if refused
    pub fn set_path(&mut self, path: &str) -> bool {
        self.message.set_path(path)
    }

    /// Set the interface; false if refused
    pub fn set_interface(&mut self, interface: &str) -> bool {
        self.message.set_interface(interface)
    }

    /// Set the member; false if refused
    pub fn set_member(&mut self, member: &str) -> bool {
        self.message.set_member(member)
    }

    /// Replace the body, refusing one that makes the message oversize
    pub fn set_body(&mut self, body: Vec<Variant>) -> Result<()> {
        self.message.set_body(body)
    }

    /// Whether this signal is `interface.member`
    pub fn is_signal(&self, interface: &str, member: &str) -> bool {
        self.message.has_interface(interface) && self.message.has_member(member)
    }

    /// Underlying message
    pub fn as_message(&self) -> &Message {
        &self.message
    }

    /// Unwrap into the underlying message
    pub fn into_message(self) -> Message {
        self.message
    }
}

impl TryFrom<Message> for SignalEnvelope {
    type Error = BusError;

    fn try_from(message: Message) -> Result<Self> {
        ensure_signal(&message)?;
        Ok(Self { message })
    }
}

impl Deref for SignalEnvelope {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.message
    }
}

/// Two envelopes are equal when `self` is the signal named by the other's
/// interface and member. An envelope missing either equals nothing.
impl PartialEq for SignalEnvelope {
    fn eq(&self, other: &Self) -> bool {
        match (other.interface(), other.member()) {
            (Some(interface), Some(member)) => self.is_signal(interface, member),
            _ => false,
        }
    }
}

/// Read-only signal view over a borrowed message
#[derive(Debug, Clone, Copy)]
pub struct SignalView<'a> {
    message: &'a Message,
}

impl<'a> SignalView<'a> {
    /// Whether this signal is `interface.member`
    pub fn is_signal(&self, interface: &str, member: &str) -> bool {
        self.message.has_interface(interface) && self.message.has_member(member)
    }

    /// Copy into an owned envelope
    pub fn to_envelope(&self) -> SignalEnvelope {
        SignalEnvelope {
            message: self.message.clone(),
        }
    }

    /// Underlying message
    pub fn as_message(&self) -> &'a Message {
        self.message
    }
}

impl<'a> TryFrom<&'a Message> for SignalView<'a> {
    type Error = BusError;

    fn try_from(message: &'a Message) -> Result<Self> {
        ensure_signal(message)?;
        Ok(Self { message })
    }
}

impl Deref for SignalView<'_> {
    type Target = Message;

    fn deref(&self) -> &Message {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_from_fields() {
        let env = SignalEnvelope::new("/org/example", "org.example.Iface", "Changed");
        assert_eq!(env.kind(), MessageType::Signal);
        assert_eq!(env.path(), Some("/org/example"));
        assert_eq!(env.interface(), Some("org.example.Iface"));
        assert_eq!(env.member(), Some("Changed"));
    }

    #[test]
    fn test_with_member() {
        let mut env = SignalEnvelope::with_member("Changed");
        assert_eq!(env.kind(), MessageType::Signal);
        assert_eq!(env.member(), Some("Changed"));
        assert_eq!(env.path(), None);
        assert_eq!(env.interface(), None);

        assert!(env.set_path("/x"));
        assert!(env.set_interface("org.example.Iface"));
        assert_eq!(env.path(), Some("/x"));
    }

    #[test]
    fn test_try_from_rejects_other_kinds() {
        for kind in [MessageType::MethodCall, MessageType::MethodReturn, MessageType::Error] {
            match SignalEnvelope::try_from(Message::new(kind)) {
                Err(BusError::WrongMessageKind { expected, actual }) => {
                    assert_eq!(expected, MessageType::Signal);
                    assert_eq!(actual, kind);
                },
                other => panic!("unexpected: {other:?}"),
            }
            assert!(SignalEnvelope::view(&Message::new(kind)).is_err());
        }
    }

    #[test]
    fn test_try_from_preserves_fields() {
        let msg = Message::signal("/a/b", "org.example.Iface", "Changed");
        let view = SignalEnvelope::view(&msg).unwrap();
        assert_eq!(view.path(), Some("/a/b"));
        assert!(view.is_signal("org.example.Iface", "Changed"));

        let env = SignalEnvelope::try_from(msg.clone()).unwrap();
        assert_eq!(env.as_message(), &msg);
    }

    #[test]
    fn test_equality_matches_interface_and_member() {
        let a = SignalEnvelope::new("/a", "org.example.Iface", "Changed");
        let b = SignalEnvelope::new("/b", "org.example.Iface", "Changed");
        let c = SignalEnvelope::new("/a", "org.example.Iface", "Removed");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, SignalEnvelope::with_member("Changed"));
    }

    #[test]
    fn test_path_decomposed() {
        let env = SignalEnvelope::new("/a/b/c", "org.example.Iface", "Changed");
        assert_eq!(env.path_decomposed().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let root = SignalEnvelope::new("/", "org.example.Iface", "Changed");
        assert_eq!(root.path_decomposed().count(), 0);
    }
}
