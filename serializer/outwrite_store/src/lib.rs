//! A keyed attribute container with validated string keys.
//!
//! # Example
//!
//! ``` rust
//! use outwrite_store::{AttributeStore, Error};
//! use outwrite_value::Value;
//!
//! let mut store = AttributeStore::new();
//!
//! store.set("name", Value::from("simmy")).unwrap();
//! store.set("count", Value::from(3)).unwrap();
//!
//! assert_eq!(store.get("name").unwrap(), Some(&Value::from("simmy")));
//! assert_eq!(store.count(), 2);
//!
//! // assigning the absent marker removes the entry
//! store.set("count", None).unwrap();
//! assert!(!store.exists("count").unwrap());
//!
//! // keys must be non-empty names
//! assert!(matches!(store.set("", Value::from(1)), Err(Error::InvalidKey(_))));
//! assert!(matches!(store.set(123, Value::from(1)), Err(Error::InvalidKey(_))));
//! ```

use std::borrow::Cow;

use log::trace;
use outwrite_value::{Mapping, Record, Value};

/// An error occurs when operating on an [`AttributeStore`].
#[derive(
    Debug, Clone, PartialEq, Eq, thiserror::Error, displaydoc::Display,
)]
pub enum Error {
    /// the attribute source is not a keyed collection
    InvalidInput,

    /// {0} is not a valid attribute key
    InvalidKey(String),
}

/// A key given to an [`AttributeStore`] operation.
///
/// Only non-empty [`Key::Name`]s are valid; indices exist so that callers
/// holding positional keys get an [`Error::InvalidKey`] instead of a silent
/// conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key<'a> {
    /// A named key.
    Name(&'a str),

    /// A positional key.
    Index(i64),
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self { Self::Name(name) }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(name: &'a String) -> Self { Self::Name(name) }
}

impl From<i32> for Key<'_> {
    fn from(index: i32) -> Self { Self::Index(i64::from(index)) }
}

impl From<i64> for Key<'_> {
    fn from(index: i64) -> Self { Self::Index(index) }
}

impl From<usize> for Key<'_> {
    fn from(index: usize) -> Self {
        Self::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl<'a> Key<'a> {
    fn validate(self) -> Result<&'a str, Error> {
        match self {
            Self::Name(name) if !name.is_empty() => Ok(name),
            key => Err(Error::InvalidKey(key.to_string())),
        }
    }
}

impl std::fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name:?}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A mapping from non-empty string keys to [`Value`]s.
///
/// Entries are kept in insertion order. The absent marker ([`None`]) is
/// never stored: assigning it removes the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    entries: Mapping,
}

impl AttributeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates a store initialized from the entries of a keyed collection.
    ///
    /// # Errors
    ///
    /// See [`AttributeStore::import`].
    pub fn from_value(initial: Value) -> Result<Self, Error> {
        let mut store = Self::new();
        store.import(initial)?;

        Ok(store)
    }

    /// Imports every entry of a keyed collection into the store.
    ///
    /// Mappings and records contribute their entries. An empty sequence is an
    /// empty collection; a non-empty one only has positional keys.
    ///
    /// The import is all-or-nothing: if any key is rejected, the store is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `initial` is a scalar.
    /// - [`Error::InvalidKey`] if any key is empty or positional.
    pub fn import(&mut self, initial: Value) -> Result<(), Error> {
        let entries = match initial {
            Value::Mapping(entries) => entries,
            Value::Record(record) => record.into_fields(),
            Value::Sequence(elements) if elements.is_empty() => Mapping::new(),
            Value::Sequence(_) => {
                return Err(Error::InvalidKey(Key::Index(0).to_string()))
            }
            Value::Bool(_)
            | Value::Integer(_)
            | Value::Float(_)
            | Value::String(_) => return Err(Error::InvalidInput),
        };

        for key in entries.keys() {
            Key::from(key).validate()?;
        }

        trace!("importing {} attributes", entries.len());
        self.entries.extend(entries);

        Ok(())
    }

    /// Sets the value of `key`, or removes it if `value` is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty or positional.
    pub fn set<'k>(
        &mut self,
        key: impl Into<Key<'k>>,
        value: impl Into<Option<Value>>,
    ) -> Result<(), Error> {
        let key = key.into().validate()?;

        match value.into() {
            Some(value) => {
                self.entries.insert(key.to_owned(), value);
            }
            None => {
                trace!("attribute `{key}` removed");
                self.entries.shift_remove(key);
            }
        }

        Ok(())
    }

    /// Removes `key` and returns its previous value, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty or positional.
    pub fn remove<'k>(
        &mut self,
        key: impl Into<Key<'k>>,
    ) -> Result<Option<Value>, Error> {
        let key = key.into().validate()?;

        Ok(self.entries.shift_remove(key))
    }

    /// Returns the value stored under `key`. An unset key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty or positional.
    pub fn get<'k>(
        &self,
        key: impl Into<Key<'k>>,
    ) -> Result<Option<&Value>, Error> {
        let key = key.into().validate()?;

        Ok(self.entries.get(key))
    }

    /// Like [`AttributeStore::get`], but a stored mapping is returned as a
    /// record-shaped view named [`Record::ANONYMOUS`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty or positional.
    pub fn get_as_record<'k>(
        &self,
        key: impl Into<Key<'k>>,
    ) -> Result<Option<Cow<'_, Value>>, Error> {
        Ok(self.get(key)?.map(|value| match value {
            Value::Mapping(entries) => {
                Cow::Owned(Value::Record(Record::anonymous(entries.clone())))
            }
            value => Cow::Borrowed(value),
        }))
    }

    /// Returns all stored entries.
    #[must_use]
    pub const fn entries(&self) -> &Mapping { &self.entries }

    /// Returns all stored entries as a record-shaped view.
    #[must_use]
    pub fn to_record(&self) -> Record { Record::anonymous(self.entries.clone()) }

    /// Returns `true` if `key` has a stored value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty or positional.
    pub fn exists<'k>(&self, key: impl Into<Key<'k>>) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    /// Returns `true` if `key` is unset or holds a blank value: an empty
    /// collection, zero, `false`, `""` or `"0"`. Records are never blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty or positional.
    pub fn is_empty<'k>(&self, key: impl Into<Key<'k>>) -> Result<bool, Error> {
        Ok(self.get(key)?.map_or(true, is_blank))
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn count(&self) -> usize { self.entries.len() }

    /// Returns an iterator over the stored entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }
}

#[allow(clippy::float_cmp)]
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Bool(value) => !value,
        Value::Integer(value) => *value == 0,
        Value::Float(value) => *value == 0.0,
        Value::String(value) => value.is_empty() || value == "0",
        Value::Sequence(elements) => elements.is_empty(),
        Value::Mapping(entries) => entries.is_empty(),
        Value::Record(_) => false,
    }
}

impl TryFrom<Value> for AttributeStore {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<AttributeStore> for Value {
    fn from(store: AttributeStore) -> Self { Self::Mapping(store.entries) }
}

impl IntoIterator for AttributeStore {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}

impl<'a> IntoIterator for &'a AttributeStore {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}
