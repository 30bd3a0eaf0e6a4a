//! Bus binding error types.
//!
//! # Error Classification
//!
//! Every failure in this crate is a wire-compatibility problem surfaced
//! synchronously to the caller:
//!
//! | Error              | Raised by                                        |
//! |--------------------|--------------------------------------------------|
//! | `InvalidName`      | validated name constructors, property creation   |
//! | `WrongMessageKind` | `SignalEnvelope` built from a non-SIGNAL message |
//! | `TypeMismatch`     | typed property reads and change conversions      |
//! | `OversizeMessage`  | message bodies over the `2^27` byte bound        |
//! | `Remote`           | proxy-side `Set` rejected by the transport       |
//!
//! The name validators in [`crate::names`] never return errors; they
//! classify with a plain `bool`.

use thiserror::Error;

use crate::message::MessageType;
use crate::names::NameKind;

/// Bus binding errors.
#[derive(Error, Debug)]
pub enum BusError {
    /// A bus, interface, member or error name failed its grammar.
    #[error("Invalid {kind} name: {name:?}")]
    InvalidName {
        /// Which grammar was applied.
        kind: NameKind,
        /// The rejected text.
        name: String,
    },

    /// A signal envelope was requested over a message of another kind.
    #[error("Invalid message type: expected {expected}, got {actual}")]
    WrongMessageKind {
        /// Kind required by the operation.
        expected: MessageType,
        /// Kind of the source message.
        actual: MessageType,
    },

    /// A variant did not hold the requested type.
    #[error("Type mismatch: expected signature {expected:?}, got {actual:?}")]
    TypeMismatch {
        /// Signature of the requested type.
        expected: String,
        /// Signature of the stored value.
        actual: String,
    },

    /// A typed read found no value stored.
    #[error("Property {interface}.{name} has no value")]
    Unset {
        /// Owning interface.
        interface: String,
        /// Property name.
        name: String,
    },

    /// Message exceeds the protocol size ceiling.
    #[error("Message too large: {size} bytes (max {max})")]
    OversizeMessage {
        /// Encoded size in bytes.
        size: usize,
        /// Largest accepted size.
        max: usize,
    },

    /// A message header field was refused.
    #[error("Invalid header field: {0}")]
    InvalidField(String),

    /// Remote property call failed or timed out in the transport.
    #[error("Remote error: {0}")]
    Remote(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for bus operations
pub type Result<T> = std::result::Result<T, BusError>;

impl From<toml::de::Error> for BusError {
    fn from(err: toml::de::Error) -> Self {
        BusError::Config(err.to_string())
    }
}

impl BusError {
    /// Build a `TypeMismatch` from two signatures.
    pub(crate) fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        BusError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
