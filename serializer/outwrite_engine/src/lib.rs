//! Encodes a [`Value`] into one of several text formats and caches the
//! result.
//!
//! An [`Engine`] is created once per subject and format. The first call to
//! [`Engine::output`] or [`Engine::emit`] runs the encoder; later calls return
//! the cached text.
//!
//! # Example
//!
//! ``` rust
//! use outwrite_engine::{Engine, Options};
//! use outwrite_value::Value;
//!
//! let subject: Value =
//!     [("a", Value::from(1)), ("b", Value::from(2))].into_iter().collect();
//!
//! let mut engine = Engine::new(subject, "CSV").unwrap();
//! assert_eq!(engine.output().unwrap(), "a,b\n1,2\n");
//!
//! let mut engine = Engine::new(Value::from("text"), "json").unwrap();
//! engine.set_options(Options::PRETTY_PRINT.bits());
//! assert_eq!(engine.output().unwrap(), "\"text\"");
//! ```

use std::io::Write;

use log::{debug, trace};
use outwrite_markup::{MarkupBuilder, TreeBuilder};
use outwrite_value::Value;

mod json;
pub mod native;
mod options;
mod tabular;

pub use options::Options;

/// The number of spaces per nesting level of pretty-printed markup.
pub const MARKUP_INDENT: usize = 2;

/// The output encodings an [`Engine`] can produce.
///
/// Parsed case-insensitively from its name or one of its aliases.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum_macros::EnumString,
    strum_macros::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Format {
    /// XML built by the engine's [`TreeBuilder`]; also named `xml`.
    #[default]
    #[strum(to_string = "markup", serialize = "xml")]
    Markup,

    /// JSON text.
    #[strum(to_string = "json")]
    Json,

    /// The self-describing RON encoding of [`native`]; also named `ron` or
    /// `php`.
    #[strum(to_string = "native", serialize = "ron", serialize = "php")]
    Native,

    /// A header line and a data line of comma-separated values; also named
    /// `csv`.
    #[strum(to_string = "tabular", serialize = "csv")]
    Tabular,
}

impl Format {
    /// All formats, in declaration order.
    pub const ALL: [Self; 4] =
        [Self::Markup, Self::Json, Self::Native, Self::Tabular];

    /// Parses a format name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the name is not recognized.
    pub fn parse(name: &str) -> Result<Self, Error> {
        name.parse().map_err(|_| Error::UnsupportedFormat(name.to_owned()))
    }
}

/// An error occurs when constructing an [`Engine`] or producing its output.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("the subject to encode is absent")]
    InvalidInput,

    #[error("`{0}` is not a supported output format")]
    UnsupportedFormat(String),

    #[error("tabular output cannot represent {0}")]
    UnsupportedShape(&'static str),

    #[error("failed to encode {format} output: {message}")]
    Encoding {
        /// The format whose encoder failed.
        format: Format,

        /// The message reported by the encoder.
        message: String,
    },

    #[error("failed to write the output: {0}")]
    Sink(#[from] std::io::Error),
}

impl Error {
    fn encoding(format: Format, error: impl std::fmt::Display) -> Self {
        Self::Encoding { format, message: error.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct State {
    subject_raw: Option<Value>,
    subject_normalized: Value,
    format: Format,
    options: u32,
    output: Option<String>,
}

/// Encodes one subject in one [`Format`] and caches the encoded text.
///
/// The markup format delegates to the `B` collaborator; every other format is
/// encoded by the engine itself.
#[derive(Debug, Clone)]
pub struct Engine<B = MarkupBuilder> {
    state: State,
    tree_builder: B,
}

impl Engine {
    /// Creates an engine that renders markup with [`MarkupBuilder`].
    ///
    /// # Errors
    ///
    /// See [`Engine::with_tree_builder`].
    pub fn new(
        subject: impl Into<Option<Value>>,
        format: &str,
    ) -> Result<Self, Error> {
        Self::with_tree_builder(subject, format, MarkupBuilder)
    }
}

impl<B: TreeBuilder> Engine<B> {
    /// Creates an engine that renders markup with the given builder.
    ///
    /// A record subject is kept verbatim for the native format; every other
    /// format encodes its fields.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `subject` is absent.
    /// - [`Error::UnsupportedFormat`] if `format` names no [`Format`].
    pub fn with_tree_builder(
        subject: impl Into<Option<Value>>,
        format: &str,
        tree_builder: B,
    ) -> Result<Self, Error> {
        let subject = subject.into().ok_or(Error::InvalidInput)?;
        let format = Format::parse(format)?;

        let (subject_raw, subject_normalized) = match subject {
            Value::Record(record) => {
                let projection = Value::Mapping(record.fields().clone());
                (Some(Value::Record(record)), projection)
            }
            subject => (None, subject),
        };

        debug!("engine created for {format} output");

        Ok(Self {
            state: State {
                subject_raw,
                subject_normalized,
                format,
                options: 0,
                output: None,
            },
            tree_builder,
        })
    }

    /// Replaces the option bitmask. Bits without a meaning in [`Options`] are
    /// kept but ignored. An already cached output is not affected.
    pub fn set_options(&mut self, options: u32) {
        if self.state.output.is_some() {
            trace!("options {options:#x} set after generation");
        }

        self.state.options = options;
    }

    /// Encodes the subject and caches the result, replacing any previous
    /// output.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedShape`] if the subject cannot be tabulated.
    /// - [`Error::Encoding`] if an underlying encoder fails.
    pub fn generate(&mut self) -> Result<(), Error> {
        self.state.output = Some(self.encode()?);

        Ok(())
    }

    /// Returns the encoded subject, generating it on first use.
    ///
    /// # Errors
    ///
    /// See [`Engine::generate`].
    pub fn output(&mut self) -> Result<&str, Error> {
        let output = match self.state.output.take() {
            Some(output) => {
                trace!("reusing cached {} output", self.state.format);
                output
            }
            None => self.encode()?,
        };

        Ok(self.state.output.insert(output).as_str())
    }

    /// Writes the encoded subject to standard output.
    ///
    /// # Errors
    ///
    /// See [`Engine::emit_to`].
    pub fn emit(&mut self) -> Result<(), Error> {
        self.emit_to(&mut std::io::stdout().lock())
    }

    /// Writes the encoded subject to `sink`, generating it on first use.
    ///
    /// # Errors
    ///
    /// - See [`Engine::generate`].
    /// - [`Error::Sink`] if writing to `sink` fails.
    pub fn emit_to(&mut self, sink: &mut impl Write) -> Result<(), Error> {
        let output = self.output()?;

        sink.write_all(output.as_bytes())?;
        sink.flush()?;

        Ok(())
    }

    fn encode(&self) -> Result<String, Error> {
        let format = self.state.format;
        let options = self.flags();

        debug!("encoding {format} output with {options:?}");

        match format {
            Format::Markup => {
                let document =
                    self.tree_builder.build_tree(&self.state.subject_normalized);

                self.tree_builder
                    .render(
                        &document,
                        options
                            .contains(Options::PRETTY_PRINT)
                            .then_some(MARKUP_INDENT),
                    )
                    .map_err(|error| Error::encoding(format, error))
            }

            Format::Json => json::encode(&self.state.subject_normalized, options)
                .map_err(|error| Error::encoding(format, error)),

            Format::Native => native::encode(
                self.state
                    .subject_raw
                    .as_ref()
                    .unwrap_or(&self.state.subject_normalized),
                options,
            )
            .map_err(|error| Error::encoding(format, error)),

            Format::Tabular => {
                tabular::encode(&self.state.subject_normalized, options)
            }
        }
    }
}

impl<B> Engine<B> {
    /// Returns the selected output format.
    #[must_use]
    pub const fn format(&self) -> Format { self.state.format }

    /// Returns the raw option bitmask.
    #[must_use]
    pub const fn options(&self) -> u32 { self.state.options }

    /// Returns the option bitmask with unknown bits dropped.
    #[must_use]
    pub const fn flags(&self) -> Options {
        Options::from_bits_truncate(self.state.options)
    }

    /// Returns the subject as given, if it was a record.
    #[must_use]
    pub const fn subject_raw(&self) -> Option<&Value> {
        self.state.subject_raw.as_ref()
    }

    /// Returns the subject the encoders work on; a record subject is replaced
    /// by its fields.
    #[must_use]
    pub const fn subject_normalized(&self) -> &Value {
        &self.state.subject_normalized
    }

    /// Returns `true` if an output is cached.
    #[must_use]
    pub const fn is_generated(&self) -> bool { self.state.output.is_some() }

    /// Returns the markup collaborator.
    #[must_use]
    pub const fn tree_builder(&self) -> &B { &self.tree_builder }
}
