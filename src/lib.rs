//! # dbus-props - Bus Name Grammar and Property Notification
//!
//! The protocol-rule core of a message-bus binding: the lexical grammar
//! of bus, interface, member and error names, the message size ceiling,
//! and the change-notification semantics of object properties.
//!
//! Socket transport, full marshalling, connection management and object
//! registration live elsewhere; this crate decides *what* goes on the
//! wire and leaves sending it to a dispatcher.
//!
//! ## Data Flow
//!
//! ```text
//!  owner                 PropertyCore                     dispatcher
//!    |                        |                                |
//!    |-- set_value(v) ------->|                                |
//!    |                        |-- store v                      |
//!    |                        |-- local observers(v)           |
//!    |                        |-- wire change (per strategy) ->|
//!    |                        |                                |-- PropertiesChanged
//!    |                        |                                |   SignalEnvelope
//! ```
//!
//! ### Notification Strategies
//!
//! | Strategy            | Wire event           | Local observers |
//! |---------------------|----------------------|-----------------|
//! | `EmitsValue`        | new value            | yes             |
//! | `EmitsInvalidation` | invalidation marker  | yes             |
//! | `Silent`            | none                 | yes             |
//!
//! ## Quick Start
//!
//! ```rust
//! use dbus_props::{names, NotificationStrategy, PropertiesChanged, TypedProperty};
//! use dbus_props::variant::ObjectPath;
//! use std::sync::{Arc, Mutex};
//!
//! assert!(names::validate_bus_name("org.freedesktop.DBus"));
//! assert!(!names::validate_member_name("2Fast"));
//!
//! let volume = TypedProperty::<u32>::create(
//!     "org.example.Player",
//!     "Volume",
//!     NotificationStrategy::EmitsValue,
//! )
//! .unwrap();
//!
//! // A dispatcher listens for wire changes and builds the signal
//! let outbox = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&outbox);
//! let path = ObjectPath::try_new("/org/example/Player").unwrap();
//! volume.core().signal_wire_change().connect(move |change| {
//!     let envelope = PropertiesChanged::from_change(change).to_envelope(&path).unwrap();
//!     sink.lock().unwrap().push(envelope);
//! });
//!
//! volume.set_value(11).unwrap();
//! assert_eq!(outbox.lock().unwrap().len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`names`]: Name grammar validators and validated name types
//! - [`variant`]: Opaque self-describing values
//! - [`signal`]: Multicast change signal
//! - [`property`]: Properties, typed properties and notification
//! - [`message`]: Messages, signal envelopes, `PropertiesChanged`
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod message;
pub mod names;
pub mod property;
pub mod signal;
pub mod variant;

// Re-exports for convenience
pub use config::Config;
pub use error::{BusError, Result};
pub use message::{Message, MessageType, PropertiesChanged, SignalEnvelope, SignalView};
pub use names::{
    message_is_small_enough, validate_bus_name, validate_error_name, validate_interface_name,
    validate_member_name, BusName, ErrorName, InterfaceName, MemberName, NameKind,
    MAX_MESSAGE_SIZE,
};
pub use property::{
    Access, ChangeKind, NotificationStrategy, PropertyChange, PropertyCore, PropertyTransport,
    SetOutcome, TypedProperty, TypedSignal,
};
pub use signal::{ChangeSignal, ListenerId};
pub use variant::{Variant, VariantArray, VariantType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
