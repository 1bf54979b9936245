//! Builds structured-markup documents from [`Value`]s and renders them as XML
//! text.
//!
//! The tree mapping is:
//!
//! - a scalar becomes the text content of its element;
//! - a mapping entry becomes a child element named after the key, or an
//!   `<item key="...">` element when the key is not a valid XML name;
//! - a sequence element becomes an `<item>` child;
//! - a record contributes its fields as children and its type name as a
//!   `type` attribute.
//!
//! Text that XML 1.0 cannot represent, such as the control characters other
//! than tab and line breaks, makes [`render`] fail instead of producing a
//! malformed document.
//!
//! # Example
//!
//! ``` rust
//! use outwrite_value::Value;
//!
//! let value: Value = [("name", Value::from("a"))].into_iter().collect();
//! let document = outwrite_markup::build_tree(&value);
//!
//! assert_eq!(
//!     outwrite_markup::render(&document, None).unwrap(),
//!     "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root><name>a</name></root>\n"
//! );
//! ```

use std::io::Write;

use getset::Getters;
use outwrite_value::{Mapping, Value};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

/// The markup version declared by rendered documents.
pub const VERSION: &str = "1.0";

/// The character encoding declared by rendered documents.
pub const ENCODING: &str = "utf-8";

/// The name of the document element.
pub const ROOT: &str = "root";

/// The name of elements that have no key of their own.
pub const ITEM: &str = "item";

/// A markup document: a declaration header and a single root element.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Document {
    /// The declared markup version.
    #[get = "pub"]
    version: String,

    /// The declared character encoding.
    #[get = "pub"]
    encoding: String,

    /// The document element.
    #[get = "pub"]
    root: Element,
}

impl Document {
    /// Creates a document with the default [`VERSION`] and [`ENCODING`].
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self {
            version: VERSION.to_owned(),
            encoding: ENCODING.to_owned(),
            root,
        }
    }
}

/// An element of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// The tag name.
    pub name: String,

    /// The attributes in declaration order.
    pub attributes: Vec<(String, String)>,

    /// The child nodes in document order.
    pub children: Vec<Node>,
}

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),

    /// Character data; escaped when rendered.
    Text(String),
}

/// An error occurs when rendering a [`Document`].
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum RenderError {
    #[error("failed to write markup: {0}")]
    Write(String),

    #[error("rendered markup is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("character {0:?} cannot appear in markup")]
    ForbiddenCharacter(char),

    #[error("`{0}` is not a valid element or attribute name")]
    InvalidName(String),
}

/// The two operations a serialization engine needs from a markup
/// collaborator.
pub trait TreeBuilder {
    /// The document tree produced by [`TreeBuilder::build_tree`].
    type Document;

    /// The error returned when rendering fails.
    type Error: std::fmt::Display;

    /// Builds the document tree for the given value.
    fn build_tree(&self, value: &Value) -> Self::Document;

    /// Renders the document as text, indenting nested elements by `indent`
    /// spaces per level if given.
    ///
    /// # Errors
    ///
    /// Returns [`TreeBuilder::Error`] if the document cannot be written.
    fn render(
        &self,
        document: &Self::Document,
        indent: Option<usize>,
    ) -> Result<String, Self::Error>;
}

/// The default [`TreeBuilder`], backed by [`build_tree`] and [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MarkupBuilder;

impl TreeBuilder for MarkupBuilder {
    type Document = Document;
    type Error = RenderError;

    fn build_tree(&self, value: &Value) -> Document { build_tree(value) }

    fn render(
        &self,
        document: &Document,
        indent: Option<usize>,
    ) -> Result<String, RenderError> {
        render(document, indent)
    }
}

/// Builds the markup tree for the given value under a [`ROOT`] element.
#[must_use]
pub fn build_tree(value: &Value) -> Document {
    Document::new(build_element(ROOT.to_owned(), Vec::new(), value))
}

fn build_element(
    name: String,
    mut attributes: Vec<(String, String)>,
    value: &Value,
) -> Element {
    let children = match value {
        Value::Sequence(elements) => elements
            .iter()
            .map(|element| {
                Node::Element(build_element(ITEM.to_owned(), Vec::new(), element))
            })
            .collect(),

        Value::Mapping(entries) => build_entries(entries),

        Value::Record(record) => {
            attributes.push(("type".to_owned(), record.type_name().clone()));
            build_entries(record.fields())
        }

        scalar => scalar
            .scalar_text()
            .filter(|text| !text.is_empty())
            .map(Node::Text)
            .into_iter()
            .collect(),
    };

    Element { name, attributes, children }
}

fn build_entries(entries: &Mapping) -> Vec<Node> {
    entries
        .iter()
        .map(|(key, value)| {
            let element = if is_xml_name(key) {
                build_element(key.clone(), Vec::new(), value)
            } else {
                build_element(
                    ITEM.to_owned(),
                    vec![("key".to_owned(), key.clone())],
                    value,
                )
            };

            Node::Element(element)
        })
        .collect()
}

/// Returns `true` if `name` can be used verbatim as an element name.
///
/// The characters must fall in the XML 1.0 name ranges. Names starting with
/// `xml` (in any case) are reserved, and `:` is rejected since no namespaces
/// are declared.
#[must_use]
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();

    let Some(first) = chars.next() else {
        return false;
    };

    if !is_name_start_char(first) {
        return false;
    }

    if name.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case("xml")) {
        return false;
    }

    chars.all(is_name_char)
}

/// Returns `true` if `character` may appear in XML 1.0 character data.
///
/// Control characters other than tab, line feed and carriage return are
/// excluded, as are the surrogates, `U+FFFE` and `U+FFFF`.
#[must_use]
pub const fn is_xml_char(character: char) -> bool {
    matches!(
        character,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

const fn is_name_start_char(character: char) -> bool {
    matches!(
        character,
        'A'..='Z'
            | '_'
            | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}'
    )
}

const fn is_name_char(character: char) -> bool {
    is_name_start_char(character)
        || matches!(
            character,
            '-' | '.'
                | '0'..='9'
                | '\u{B7}'
                | '\u{300}'..='\u{36F}'
                | '\u{203F}'..='\u{2040}'
        )
}

fn check_name(name: &str) -> Result<(), RenderError> {
    if is_xml_name(name) {
        Ok(())
    } else {
        Err(RenderError::InvalidName(name.to_owned()))
    }
}

fn check_text(text: &str) -> Result<(), RenderError> {
    match text.chars().find(|character| !is_xml_char(*character)) {
        Some(character) => Err(RenderError::ForbiddenCharacter(character)),
        None => Ok(()),
    }
}

/// Renders the document as text, preceded by its declaration and followed by
/// a newline.
///
/// With `indent`, nested elements are placed on their own lines indented by
/// the given number of spaces per level.
///
/// Characters that XML 1.0 cannot carry, even as character references, are
/// rejected rather than replaced.
///
/// # Errors
///
/// - [`RenderError::ForbiddenCharacter`] if a text node or attribute value
///   holds a character outside [`is_xml_char`].
/// - [`RenderError::InvalidName`] if an element or attribute name fails
///   [`is_xml_name`].
/// - [`RenderError::Write`] if the writer fails.
pub fn render(
    document: &Document,
    indent: Option<usize>,
) -> Result<String, RenderError> {
    let mut writer = match indent {
        Some(size) => Writer::new_with_indent(Vec::new(), b' ', size),
        None => Writer::new(Vec::new()),
    };

    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new(
            &document.version,
            Some(&document.encoding),
            None,
        )),
    )?;

    // the indenting writer breaks the line on its own
    if indent.is_none() {
        writer.get_mut().push(b'\n');
    }

    write_element(&mut writer, &document.root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');

    Ok(String::from_utf8(bytes)?)
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
) -> Result<(), RenderError> {
    check_name(&element.name)?;

    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        check_name(key)?;
        check_text(value)?;

        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;

    for child in &element.children {
        match child {
            Node::Element(element) => write_element(writer, element)?,
            Node::Text(text) => {
                check_text(text)?;
                write_event(writer, Event::Text(BytesText::new(text)))?;
            }
        }
    }

    write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn write_event<W: Write>(
    writer: &mut Writer<W>,
    event: Event<'_>,
) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|error| RenderError::Write(error.to_string()))
}

#[cfg(test)]
mod test;
