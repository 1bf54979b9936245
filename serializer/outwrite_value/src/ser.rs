//! Converts any [`serde::Serialize`] type into a [`Value`].
//!
//! This is how Rust types derive their field projection: structs become
//! [`Record`]s named after the type, so the projection needs no runtime
//! reflection.

use std::fmt::Display;

use serde::{ser, Serialize};

use crate::{Mapping, Record, Value};

/// An error occurs when a serializable type cannot be represented as a
/// [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("an absent value cannot appear at the top level or in a sequence")]
    AbsentValue,

    #[error("mapping keys must be strings, integers or booleans")]
    UnsupportedKey,

    #[error("integer {0} does not fit in a signed 64-bit integer")]
    IntegerOutOfRange(String),

    #[error("{0}")]
    Custom(String),
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self { Self::Custom(msg.to_string()) }
}

/// Converts the given serializable value into a [`Value`].
///
/// `None`, `()` and absent struct fields are skipped; an absent value at the
/// top level or inside a sequence is an error.
///
/// # Example
///
/// ``` rust
/// use outwrite_value::{to_value, Value};
///
/// #[derive(serde::Serialize)]
/// struct Point {
///     x: i32,
///     y: i32,
///     label: Option<String>,
/// }
///
/// let value = to_value(&Point { x: 1, y: 2, label: None }).unwrap();
/// let record = value.as_record().unwrap();
///
/// assert_eq!(record.type_name(), "Point");
/// assert_eq!(record.fields().get("x"), Some(&Value::Integer(1)));
/// assert!(!record.fields().contains_key("label"));
/// ```
///
/// # Errors
///
/// See [`Error`] for the possible errors that can occur.
pub fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<Value, Error> {
    value.serialize(Serializer)?.ok_or(Error::AbsentValue)
}

/// The serializer yields [`None`] for absent values so that compound
/// serializers can decide whether absence is allowed.
struct Serializer;

fn present(value: Option<Value>) -> Result<Value, Error> {
    value.ok_or(Error::AbsentValue)
}

fn out_of_range(value: impl Display) -> Error {
    Error::IntegerOutOfRange(value.to_string())
}

impl ser::Serializer for Serializer {
    type Ok = Option<Value>;
    type Error = Error;
    type SerializeSeq = SerializeSequence;
    type SerializeTuple = SerializeSequence;
    type SerializeTupleStruct = SerializeSequence;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMapping;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeRecord;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Integer(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
        i64::try_from(v)
            .map(|v| Some(Value::Integer(v)))
            .map_err(|_| out_of_range(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        i64::try_from(v)
            .map(|v| Some(Value::Integer(v)))
            .map_err(|_| out_of_range(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
        i64::try_from(v)
            .map(|v| Some(Value::Integer(v)))
            .map_err(|_| out_of_range(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(Some(v.iter().copied().map(Value::from).collect()))
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> { Ok(None) }

    fn serialize_some<T: ?Sized + Serialize>(
        self,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> { Ok(None) }

    fn serialize_unit_struct(
        self,
        name: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Record(Record::new(name, Mapping::new()))))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::from(variant)))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        // an absent payload reads like a unit variant
        let Some(value) = value.serialize(self)? else {
            return Ok(Some(Value::from(variant)));
        };

        let mut mapping = Mapping::new();
        mapping.insert(variant.to_owned(), value);

        Ok(Some(Value::Mapping(mapping)))
    }

    fn serialize_seq(
        self,
        len: Option<usize>,
    ) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SerializeSequence { elements: Vec::with_capacity(len.unwrap_or(0)) })
    }

    fn serialize_tuple(
        self,
        len: usize,
    ) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(SerializeTupleVariant { variant, elements: Vec::with_capacity(len) })
    }

    fn serialize_map(
        self,
        len: Option<usize>,
    ) -> Result<Self::SerializeMap, Self::Error> {
        Ok(SerializeMapping {
            entries: Mapping::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(SerializeRecord {
            record: Record::new(name, Mapping::with_capacity(len)),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(SerializeRecord {
            record: Record::new(
                format!("{name}::{variant}"),
                Mapping::with_capacity(len),
            ),
        })
    }
}

struct SerializeSequence {
    elements: Vec<Value>,
}

impl SerializeSequence {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.elements.push(present(value.serialize(Serializer)?)?);
        Ok(())
    }
}

impl ser::SerializeSeq for SerializeSequence {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Sequence(self.elements)))
    }
}

impl ser::SerializeTuple for SerializeSequence {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Sequence(self.elements)))
    }
}

impl ser::SerializeTupleStruct for SerializeSequence {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Sequence(self.elements)))
    }
}

struct SerializeTupleVariant {
    variant: &'static str,
    elements: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.elements.push(present(value.serialize(Serializer)?)?);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        let mut mapping = Mapping::new();
        mapping.insert(self.variant.to_owned(), Value::Sequence(self.elements));

        Ok(Some(Value::Mapping(mapping)))
    }
}

struct SerializeMapping {
    entries: Mapping,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMapping {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(
        &mut self,
        key: &T,
    ) -> Result<(), Self::Error> {
        // integer and boolean keys are stringified the way JSON does it
        let key = match key.serialize(Serializer)? {
            Some(Value::String(key)) => key,
            Some(Value::Integer(key)) => key.to_string(),
            Some(Value::Bool(key)) => key.to_string(),
            _ => return Err(Error::UnsupportedKey),
        };

        self.next_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<(), Self::Error> {
        let key = self.next_key.take().ok_or_else(|| {
            Error::Custom("serialize_value called before serialize_key".into())
        })?;

        if let Some(value) = value.serialize(Serializer)? {
            self.entries.insert(key, value);
        }

        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Mapping(self.entries)))
    }
}

struct SerializeRecord {
    record: Record,
}

impl SerializeRecord {
    fn insert<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        if let Some(value) = value.serialize(Serializer)? {
            self.record.fields.insert(key.to_owned(), value);
        }

        Ok(())
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.insert(key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Record(self.record)))
    }
}

impl ser::SerializeStructVariant for SerializeRecord {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.insert(key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::Record(self.record)))
    }
}
