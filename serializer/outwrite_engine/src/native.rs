//! The native format: a self-describing RON encoding of [`Value`].
//!
//! Every value is tagged with its variant and records keep their type name,
//! so [`decode`] reproduces exactly what [`encode`] was given.
//!
//! ``` rust
//! use outwrite_engine::{native, Options};
//! use outwrite_value::{Record, Value};
//!
//! let record = Value::Record(Record::new(
//!     "Point",
//!     [("x".to_owned(), Value::from(1))].into_iter().collect(),
//! ));
//!
//! let text = native::encode(&record, Options::empty()).unwrap();
//! assert_eq!(native::decode(&text).unwrap(), record);
//! ```

use outwrite_value::Value;
use ron::ser::PrettyConfig;

use crate::Options;

/// An error occurs when decoding malformed native text.
#[derive(Debug, thiserror::Error)]
#[error("malformed native encoding: {0}")]
pub struct DecodeError(#[from] ron::error::SpannedError);

/// Encodes the value; [`Options::PRETTY_PRINT`] spreads collections over
/// indented lines.
///
/// # Errors
///
/// Returns the RON serializer's error; it does not occur for values built
/// through this crate.
pub fn encode(value: &Value, options: Options) -> Result<String, ron::Error> {
    if options.contains(Options::PRETTY_PRINT) {
        ron::ser::to_string_pretty(value, PrettyConfig::new())
    } else {
        ron::to_string(value)
    }
}

/// Decodes text produced by [`encode`].
///
/// # Errors
///
/// Returns [`DecodeError`] if the text is not a native encoding of a
/// [`Value`].
pub fn decode(text: &str) -> Result<Value, DecodeError> {
    Ok(ron::from_str(text)?)
}
