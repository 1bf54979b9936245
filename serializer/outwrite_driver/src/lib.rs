//! Contains the main `run()` function for the `outwrite` executable.

use std::{
    ffi::OsStr,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    process::ExitCode,
};

use log::debug;
use outwrite_engine::{native, Engine, Options};
use outwrite_store::AttributeStore;
use outwrite_value::{Mapping, Record, Value};

/// The arguments to the program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::Parser)]
#[clap(
    name = "outwrite",
    about = "Encodes structured data as markup, JSON, native RON or CSV",
    author = "Simmypeet"
)]
pub struct Arguments {
    /// The `.json` or `.ron` file holding the subject. If not specified, the
    /// subject starts as an empty mapping.
    pub input: Option<PathBuf>,

    /// The output format: `markup` (`xml`), `json`, `native` (`ron`, `php`)
    /// or `tabular` (`csv`).
    #[clap(short, long, default_value = "markup")]
    pub format: String,

    /// Sets a top-level attribute of the subject. The value is read as a JSON
    /// scalar if possible, else as a string; an empty value removes the
    /// attribute.
    #[clap(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub attributes: Vec<String>,

    /// Wraps the subject into a record of the given type.
    #[clap(short, long, value_name = "TYPE")]
    pub record: Option<String>,

    /// Indents the output.
    #[clap(long)]
    pub pretty: bool,

    /// Encodes JSON sequences as objects keyed by position.
    #[clap(long)]
    pub force_object: bool,

    /// Ends tabular lines with `\r\n`.
    #[clap(long)]
    pub crlf: bool,

    /// Omits the tabular header line.
    #[clap(long)]
    pub no_header: bool,

    /// The raw option bitmask; the option flags are added to it.
    #[clap(long, default_value_t = 0)]
    pub options: u32,

    /// The output path. If not specified, the output is written to the
    /// standard output.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

impl Arguments {
    /// Returns the option bitmask given by [`Arguments::options`] and the
    /// option flags.
    #[must_use]
    pub fn option_bits(&self) -> u32 {
        let mut flags = Options::empty();

        flags.set(Options::PRETTY_PRINT, self.pretty);
        flags.set(Options::FORCE_OBJECT, self.force_object);
        flags.set(Options::CRLF, self.crlf);
        flags.set(Options::NO_HEADER, self.no_header);

        self.options | flags.bits()
    }
}

/// An error occurs when running the program.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Io {
        /// The file being read or written.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error("{}: expected a `.json` or `.ron` file", .0.display())]
    UnknownInput(PathBuf),

    #[error("{}: {source}", .path.display())]
    Json {
        /// The input file.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", .path.display())]
    Native {
        /// The input file.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: native::DecodeError,
    },

    #[error("{}: {source}", .path.display())]
    Conversion {
        /// The input file.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: outwrite_value::Error,
    },

    #[error("`{0}` is not a `KEY=VALUE` assignment")]
    Assignment(String),

    #[error(transparent)]
    Store(#[from] outwrite_store::Error),

    #[error(transparent)]
    Engine(#[from] outwrite_engine::Error),
}

/// Loads the subject named by the arguments: the input file with the
/// attribute assignments applied, wrapped into a record if requested.
///
/// A JSON `null` input is an absent subject.
///
/// # Errors
///
/// Returns [`Error`] if the input cannot be read or decoded, or an attribute
/// cannot be applied.
pub fn load_subject(arguments: &Arguments) -> Result<Option<Value>, Error> {
    let subject = match &arguments.input {
        Some(path) => read_input(path)?,
        None => Some(Value::Mapping(Mapping::new())),
    };

    subject.map(|subject| apply_attributes(subject, arguments)).transpose()
}

/// Creates the engine for the subject, format and options named by the
/// arguments.
///
/// # Errors
///
/// See [`load_subject`] and [`Engine::new`].
pub fn engine(arguments: &Arguments) -> Result<Engine, Error> {
    let mut engine = Engine::new(load_subject(arguments)?, &arguments.format)?;
    engine.set_options(arguments.option_bits());

    Ok(engine)
}

/// Encodes the subject and writes it to the output.
///
/// # Errors
///
/// Returns [`Error`] if any step fails.
pub fn execute(arguments: &Arguments) -> Result<(), Error> {
    let mut engine = engine(arguments)?;

    match &arguments.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|source| Error::Io { path: path.clone(), source })?;

            engine.emit_to(&mut BufWriter::new(file))?;
            debug!("output written to {}", path.display());
        }
        None => engine.emit()?,
    }

    Ok(())
}

/// Runs the program with the given arguments.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn run(arguments: Arguments) -> ExitCode {
    match execute(&arguments) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(path: &Path) -> Result<Option<Value>, Error> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    let text = std::fs::read_to_string(path)
        .map_err(|source| Error::Io { path: path.to_owned(), source })?;

    debug!("loading subject from {}", path.display());

    match extension.as_deref() {
        Some("json") => {
            let json = serde_json::from_str::<serde_json::Value>(&text)
                .map_err(|source| Error::Json { path: path.to_owned(), source })?;

            if json.is_null() {
                return Ok(None);
            }

            outwrite_value::to_value(&json).map(Some).map_err(|source| {
                Error::Conversion { path: path.to_owned(), source }
            })
        }

        Some("ron") => native::decode(&text)
            .map(Some)
            .map_err(|source| Error::Native { path: path.to_owned(), source }),

        _ => Err(Error::UnknownInput(path.to_owned())),
    }
}

fn apply_attributes(
    subject: Value,
    arguments: &Arguments,
) -> Result<Value, Error> {
    if arguments.attributes.is_empty() && arguments.record.is_none() {
        return Ok(subject);
    }

    let type_name = match (&arguments.record, &subject) {
        (Some(type_name), _) => Some(type_name.clone()),
        (None, Value::Record(record)) => Some(record.type_name().clone()),
        (None, _) => None,
    };

    let mut store = AttributeStore::from_value(subject)?;

    for assignment in &arguments.attributes {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| Error::Assignment(assignment.clone()))?;

        store.set(key, attribute_value(value))?;
    }

    debug!("subject has {} attributes", store.count());

    Ok(match type_name {
        Some(type_name) => {
            Value::Record(Record::new(type_name, store.into_iter().collect()))
        }
        None => Value::from(store),
    })
}

fn attribute_value(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }

    let value = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Bool(value)) => Value::Bool(value),
        Ok(serde_json::Value::Number(number)) => number
            .as_i64()
            .map(Value::Integer)
            .or_else(|| number.as_f64().map(Value::Float))
            .unwrap_or_else(|| Value::from(text)),
        Ok(serde_json::Value::String(value)) => Value::String(value),
        _ => Value::from(text),
    };

    Some(value)
}
