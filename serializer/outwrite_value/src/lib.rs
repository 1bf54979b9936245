//! The value model shared by every `outwrite` component.
//!
//! A [`Value`] is a closed recursive tree of scalars, ordered sequences,
//! insertion-ordered mappings and named records. Encoders pattern-match over
//! it instead of inspecting types at runtime.
//!
//! The "absent" marker is never a [`Value`]; APIs that accept absence take an
//! [`Option<Value>`] and treat [`None`] as absent.
//!
//! # Example
//!
//! ``` rust
//! use outwrite_value::{Mapping, Record, Value};
//!
//! let mut fields = Mapping::new();
//! fields.insert("x".to_string(), Value::from(1));
//! fields.insert("y".to_string(), Value::from(2));
//!
//! let point = Value::from(Record::new("Point", fields));
//!
//! assert_eq!(point.as_record().unwrap().type_name(), "Point");
//! assert_eq!(point.projection().unwrap().len(), 2);
//! ```

use derive_more::From;
use enum_as_inner::EnumAsInner;
use getset::Getters;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

mod ser;

pub use ser::{to_value, Error};

/// An insertion-ordered mapping from string keys to values.
pub type Mapping = IndexMap<String, Value>;

/// The dynamic representation of a value that can be encoded.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner, From,
)]
pub enum Value {
    /// A boolean scalar.
    Bool(bool),

    /// A signed integer scalar.
    Integer(i64),

    /// A floating point scalar.
    Float(f64),

    /// A string scalar.
    String(String),

    /// An ordered collection of values.
    Sequence(Vec<Value>),

    /// A keyed collection, iterated in insertion order.
    Mapping(Mapping),

    /// A value with a named type and named fields.
    Record(Record),
}

/// A value with a named type and a set of named fields.
///
/// Unlike a plain [`Mapping`], a record remembers its type name so that the
/// native encoding can reconstruct it rather than only its fields.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_new::new,
)]
pub struct Record {
    /// The name of the record's type.
    #[get = "pub"]
    #[new(into)]
    type_name: String,

    /// The field-name to value projection of the record.
    #[get = "pub"]
    fields: Mapping,
}

impl Record {
    /// The type name used for record-shaped views over plain mappings.
    pub const ANONYMOUS: &'static str = "anonymous";

    /// Creates a record-shaped view over a plain mapping.
    #[must_use]
    pub fn anonymous(fields: Mapping) -> Self {
        Self { type_name: Self::ANONYMOUS.to_owned(), fields }
    }

    /// Consumes the record and returns its field projection.
    #[must_use]
    pub fn into_fields(self) -> Mapping { self.fields }
}

impl Value {
    /// Returns the textual form of a scalar value, or [`None`] for
    /// collections and records.
    ///
    /// Booleans are rendered as `true`/`false` and numbers in their shortest
    /// decimal form.
    #[must_use]
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::String(value) => Some(value.clone()),
            Self::Sequence(_) | Self::Mapping(_) | Self::Record(_) => None,
        }
    }

    /// Returns `true` if the value is a scalar (not a collection or record).
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Integer(_) | Self::Float(_) | Self::String(_)
        )
    }

    /// Returns the keyed view of the value: the entries of a mapping or the
    /// fields of a record.
    #[must_use]
    pub const fn projection(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            Self::Record(record) => Some(&record.fields),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self { Self::String(value.to_owned()) }
}

macro_rules! lossless_integer {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self { Self::Integer(i64::from(value)) }
        }
    )*};
}

lossless_integer!(i8, i16, i32, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self { Self::Float(f64::from(value)) }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self::Sequence(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
