//! JSON encoding of [`Value`]s.
//!
//! Records are written as plain objects of their fields; the type name only
//! survives in the native format.

use outwrite_value::{Mapping, Value};
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serialize, Serializer,
};

use crate::Options;

struct Json<'a> {
    value: &'a Value,
    force_object: bool,
}

impl<'a> Json<'a> {
    const fn nested(&self, value: &'a Value) -> Self {
        Self { value, force_object: self.force_object }
    }

    fn serialize_entries<S: Serializer>(
        &self,
        entries: &'a Mapping,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, &self.nested(value))?;
        }

        map.end()
    }
}

impl Serialize for Json<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),

            Value::Sequence(elements) if self.force_object => {
                let mut map = serializer.serialize_map(Some(elements.len()))?;
                for (index, element) in elements.iter().enumerate() {
                    map.serialize_entry(
                        &index.to_string(),
                        &self.nested(element),
                    )?;
                }

                map.end()
            }

            Value::Sequence(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(&self.nested(element))?;
                }

                seq.end()
            }

            Value::Mapping(entries) => {
                self.serialize_entries(entries, serializer)
            }
            Value::Record(record) => {
                self.serialize_entries(record.fields(), serializer)
            }
        }
    }
}

pub(crate) fn encode(
    value: &Value,
    options: Options,
) -> Result<String, serde_json::Error> {
    let json =
        Json { value, force_object: options.contains(Options::FORCE_OBJECT) };

    if options.contains(Options::PRETTY_PRINT) {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
}
