//! String-like wire types: object paths and type signatures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BusError, Result};

/// Longest accepted type signature, in bytes
pub const MAX_SIGNATURE_LENGTH: usize = 255;

/// Type codes understood in signatures
const SIGNATURE_CODES: &[u8] = b"ybnqiuxtdsogva(){}";

/// Object path, e.g. `/org/example/Player`.
///
/// Either `/` alone, or `/`-separated non-empty elements over
/// `[A-Za-z0-9_]` with no trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Create a validated object path
    pub fn try_new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if is_valid_path(&path) {
            Ok(Self(path))
        } else {
            Err(BusError::InvalidField(format!("object path {path:?}")))
        }
    }

    /// The root path `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Get the path as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path elements in order; empty for `/`
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        path_segments(&self.0)
    }
}

/// Split a path on `/`, skipping the empty root element
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = &str> + '_ {
    path.split('/').filter(|s| !s.is_empty())
}

fn is_valid_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|element| {
        !element.is_empty()
            && element
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = BusError;

    fn try_from(path: String) -> Result<Self> {
        Self::try_new(path)
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> Self {
        path.0
    }
}

/// Type signature, e.g. `a{sv}`.
///
/// Only the character set and length are checked; nesting is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(String);

impl Signature {
    /// Create a signature
    pub fn try_new(sig: impl Into<String>) -> Result<Self> {
        let sig = sig.into();
        if sig.len() <= MAX_SIGNATURE_LENGTH && sig.bytes().all(|b| SIGNATURE_CODES.contains(&b)) {
            Ok(Self(sig))
        } else {
            Err(BusError::InvalidField(format!("signature {sig:?}")))
        }
    }

    /// Signature built from known-good type codes
    pub(crate) fn from_static(sig: &'static str) -> Self {
        Self(sig.to_string())
    }

    /// Signature built from code already produced by [`crate::variant::Variant::signature`]
    pub(crate) fn from_trusted(sig: String) -> Self {
        Self(sig)
    }

    /// Get the signature as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Signature {
    type Error = BusError;

    fn try_from(sig: String) -> Result<Self> {
        Self::try_new(sig)
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.0
    }
}
