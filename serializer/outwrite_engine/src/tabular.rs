//! Flattens a mapping of scalars into a header line and a data line of
//! comma-separated fields.

use outwrite_value::Value;

use crate::{Error, Options};

const DELIMITER: &str = ",";

pub(crate) fn encode(value: &Value, options: Options) -> Result<String, Error> {
    let entries = match value {
        Value::Mapping(entries) => entries,
        Value::Record(record) => record.fields(),
        Value::Sequence(_) => return Err(Error::UnsupportedShape("a sequence")),
        Value::Bool(_)
        | Value::Integer(_)
        | Value::Float(_)
        | Value::String(_) => return Err(Error::UnsupportedShape("a scalar")),
    };

    if entries.is_empty() {
        return Err(Error::UnsupportedShape("an empty mapping"));
    }

    let mut header = Vec::with_capacity(entries.len());
    let mut row = Vec::with_capacity(entries.len());

    for (key, value) in entries {
        let text = value
            .scalar_text()
            .ok_or(Error::UnsupportedShape("a nested collection"))?;

        header.push(quote(key.clone()));
        row.push(quote(text));
    }

    let terminator =
        if options.contains(Options::CRLF) { "\r\n" } else { "\n" };

    let mut output = String::new();

    if !options.contains(Options::NO_HEADER) {
        output.push_str(&header.join(DELIMITER));
        output.push_str(terminator);
    }

    output.push_str(&row.join(DELIMITER));
    output.push_str(terminator);

    Ok(output)
}

// RFC 4180 quoting
fn quote(field: String) -> String {
    if field.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}
