//! Opaque, self-describing property values.
//!
//! A [`Variant`] holds any value a property can carry together with
//! enough type information to check a typed extraction. Conversion
//! between Rust types and variants goes through [`VariantType`].
//!
//! | Rust type                  | Variant           | Signature |
//! |----------------------------|-------------------|-----------|
//! | `u8`                       | `Byte`            | `y`       |
//! | `bool`                     | `Bool`            | `b`       |
//! | `i16` / `u16`              | `Int16`/`UInt16`  | `n` / `q` |
//! | `i32` / `u32`              | `Int32`/`UInt32`  | `i` / `u` |
//! | `i64` / `u64`              | `Int64`/`UInt64`  | `x` / `t` |
//! | `f64`                      | `Double`          | `d`       |
//! | `String`                   | `Str`             | `s`       |
//! | `ObjectPath`               | `ObjectPath`      | `o`       |
//! | `Signature`                | `Signature`       | `g`       |
//! | `Vec<T>`                   | `Array`           | `aT`      |
//! | `BTreeMap<String, Variant>`| `Dict`            | `a{sv}`   |

mod basic;
pub(crate) mod wire;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BusError, Result};

pub use basic::{ObjectPath, Signature, MAX_SIGNATURE_LENGTH};
pub(crate) use basic::path_segments;

/// Self-describing value container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Variant {
    /// Unsigned 8-bit integer
    Byte(u8),
    /// Boolean
    Bool(bool),
    /// Signed 16-bit integer
    Int16(i16),
    /// Unsigned 16-bit integer
    UInt16(u16),
    /// Signed 32-bit integer
    Int32(i32),
    /// Unsigned 32-bit integer
    UInt32(u32),
    /// Signed 64-bit integer
    Int64(i64),
    /// Unsigned 64-bit integer
    UInt64(u64),
    /// IEEE 754 double
    Double(f64),
    /// UTF-8 string
    Str(String),
    /// Object path
    ObjectPath(ObjectPath),
    /// Type signature
    Signature(Signature),
    /// Nested variant
    Variant(Box<Variant>),
    /// Homogeneous array
    Array(VariantArray),
    /// String-keyed dictionary of variants
    Dict(BTreeMap<String, Variant>),
}

impl Variant {
    /// Build an array, checking every item against `element`
    pub fn array(element: Signature, items: Vec<Variant>) -> Result<Self> {
        VariantArray::new(element, items).map(Variant::Array)
    }

    /// Wire signature of this value
    pub fn signature(&self) -> String {
        match self {
            Variant::Byte(_) => "y".into(),
            Variant::Bool(_) => "b".into(),
            Variant::Int16(_) => "n".into(),
            Variant::UInt16(_) => "q".into(),
            Variant::Int32(_) => "i".into(),
            Variant::UInt32(_) => "u".into(),
            Variant::Int64(_) => "x".into(),
            Variant::UInt64(_) => "t".into(),
            Variant::Double(_) => "d".into(),
            Variant::Str(_) => "s".into(),
            Variant::ObjectPath(_) => "o".into(),
            Variant::Signature(_) => "g".into(),
            Variant::Variant(_) => "v".into(),
            Variant::Array(array) => format!("a{}", array.element()),
            Variant::Dict(_) => "a{sv}".into(),
        }
    }

    /// Marshalled length of this value on its own
    pub fn encoded_len(&self) -> usize {
        wire::value_end(self, 0)
    }

    /// Extract a typed value
    pub fn get<T: VariantType>(&self) -> Result<T> {
        T::from_variant(self)
    }
}

/// Array whose items all carry the element signature.
///
/// Items can only be supplied through a checked constructor, including
/// when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedArray")]
pub struct VariantArray {
    element: Signature,
    items: Vec<Variant>,
}

#[derive(Deserialize)]
struct UncheckedArray {
    element: Signature,
    items: Vec<Variant>,
}

impl VariantArray {
    /// Build an array, checking every item against `element`
    pub fn new(element: Signature, items: Vec<Variant>) -> Result<Self> {
        if let Some(bad) = items.iter().find(|v| v.signature() != element.as_str()) {
            return Err(BusError::mismatch(element.as_str(), bad.signature()));
        }
        Ok(Self { element, items })
    }

    /// Items already known to match `element`
    pub(crate) fn from_trusted(element: Signature, items: Vec<Variant>) -> Self {
        debug_assert!(items.iter().all(|v| v.signature() == element.as_str()));
        Self { element, items }
    }

    /// Signature shared by every item
    pub fn element(&self) -> &Signature {
        &self.element
    }

    /// Items
    pub fn items(&self) -> &[Variant] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the items
    pub fn into_items(self) -> Vec<Variant> {
        self.items
    }
}

impl TryFrom<UncheckedArray> for VariantArray {
    type Error = BusError;

    fn try_from(raw: UncheckedArray) -> Result<Self> {
        Self::new(raw.element, raw.items)
    }
}

/// Conversion between a Rust type and [`Variant`]
pub trait VariantType: Sized {
    /// Wire signature of the type
    fn signature() -> String;

    /// Wrap the value
    fn into_variant(self) -> Variant;

    /// Unwrap, failing with [`BusError::TypeMismatch`] on any other type
    fn from_variant(value: &Variant) -> Result<Self>;
}

macro_rules! basic_variant_type {
    ($ty:ty, $arm:ident, $sig:literal) => {
        impl VariantType for $ty {
            fn signature() -> String {
                $sig.to_string()
            }

            fn into_variant(self) -> Variant {
                Variant::$arm(self)
            }

            fn from_variant(value: &Variant) -> Result<Self> {
                match value {
                    Variant::$arm(v) => Ok(v.clone()),
                    other => Err(BusError::mismatch($sig, other.signature())),
                }
            }
        }

        impl From<$ty> for Variant {
            fn from(v: $ty) -> Self {
                Variant::$arm(v)
            }
        }
    };
}

basic_variant_type!(u8, Byte, "y");
basic_variant_type!(bool, Bool, "b");
basic_variant_type!(i16, Int16, "n");
basic_variant_type!(u16, UInt16, "q");
basic_variant_type!(i32, Int32, "i");
basic_variant_type!(u32, UInt32, "u");
basic_variant_type!(i64, Int64, "x");
basic_variant_type!(u64, UInt64, "t");
basic_variant_type!(f64, Double, "d");
basic_variant_type!(String, Str, "s");
basic_variant_type!(ObjectPath, ObjectPath, "o");
basic_variant_type!(Signature, Signature, "g");

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::Str(v.to_string())
    }
}

impl<T: VariantType> VariantType for Vec<T> {
    fn signature() -> String {
        format!("a{}", T::signature())
    }

    fn into_variant(self) -> Variant {
        Variant::Array(VariantArray::from_trusted(
            Signature::from_trusted(T::signature()),
            self.into_iter().map(VariantType::into_variant).collect(),
        ))
    }

    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Array(array) if array.element().as_str() == T::signature() => {
                array.items().iter().map(T::from_variant).collect()
            },
            other => Err(BusError::mismatch(Self::signature(), other.signature())),
        }
    }
}

impl VariantType for BTreeMap<String, Variant> {
    fn signature() -> String {
        "a{sv}".to_string()
    }

    fn into_variant(self) -> Variant {
        Variant::Dict(self)
    }

    fn from_variant(value: &Variant) -> Result<Self> {
        match value {
            Variant::Dict(map) => Ok(map.clone()),
            other => Err(BusError::mismatch("a{sv}", other.signature())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures() {
        assert_eq!(Variant::from(7i32).signature(), "i");
        assert_eq!(Variant::from("x").signature(), "s");
        assert_eq!(vec![1u8, 2, 3].into_variant().signature(), "ay");
        assert_eq!(
            vec![vec!["a".to_string()]].into_variant().signature(),
            "aas"
        );
        assert_eq!(Variant::Dict(BTreeMap::new()).signature(), "a{sv}");
    }

    #[test]
    fn test_typed_extraction() {
        let v = Variant::from(42u32);
        assert_eq!(v.get::<u32>().unwrap(), 42);

        match v.get::<i32>() {
            Err(BusError::TypeMismatch { expected, actual }) => {
                assert_eq!(expected, "i");
                assert_eq!(actual, "u");
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_vec_extraction_checks_element() {
        let v = vec![1i32, 2].into_variant();
        assert_eq!(v.get::<Vec<i32>>().unwrap(), vec![1, 2]);
        assert!(v.get::<Vec<u32>>().is_err());
    }

    #[test]
    fn test_array_rejects_mixed_items() {
        let element = Signature::try_new("i").unwrap();
        assert!(Variant::array(element.clone(), vec![1i32.into(), 2i32.into()]).is_ok());
        assert!(Variant::array(element, vec![1i32.into(), "two".into()]).is_err());
    }

    #[test]
    fn test_array_deserialize_is_checked() {
        let good = r#"{"type":"array","value":{"element":"i","items":[{"type":"int32","value":1}]}}"#;
        let v: Variant = serde_json::from_str(good).unwrap();
        assert_eq!(v.signature(), "ai");
        assert_eq!(v.get::<Vec<i32>>().unwrap(), vec![1]);

        let mixed = r#"{"type":"array","value":{"element":"i","items":[{"type":"str","value":"x"}]}}"#;
        assert!(serde_json::from_str::<Variant>(mixed).is_err());
    }

    #[test]
    fn test_encoded_len_dict() {
        let mut map = BTreeMap::new();
        map.insert("Volume".to_string(), Variant::from(5i32));
        // len(4) pad(8) key(4+6+1=19) sig(3=22) pad(24) int(28)
        assert_eq!(Variant::Dict(map).encoded_len(), 28);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Variant::from(true)).unwrap();
        assert_eq!(json, r#"{"type":"bool","value":true}"#);
        let back: Variant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Variant::Bool(true));
    }
}
