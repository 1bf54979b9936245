use outwrite_value::{Mapping, Record, Value};

use crate::{
    build_tree, is_xml_char, is_xml_name, render, Document, Element, Node,
    RenderError, ITEM, ROOT,
};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

fn text(name: &str, content: &str) -> Node {
    Node::Element(Element {
        name: name.to_owned(),
        attributes: Vec::new(),
        children: vec![Node::Text(content.to_owned())],
    })
}

fn compact(value: &Value) -> String {
    render(&build_tree(value), None).unwrap()
}

#[test]
fn tree_of_mapping() {
    let value: Value =
        [("name", Value::from("a")), ("count", Value::from(3))]
            .into_iter()
            .collect();

    let document = build_tree(&value);

    assert_eq!(document.version(), "1.0");
    assert_eq!(document.encoding(), "utf-8");
    assert_eq!(document.root().name, ROOT);
    assert_eq!(document.root().children, [
        text("name", "a"),
        text("count", "3")
    ]);
}

#[test]
fn tree_of_sequence_and_record() {
    let mut fields = Mapping::new();
    fields.insert("x".to_owned(), Value::from(1));

    let value = Value::Sequence(vec![
        Value::from(true),
        Value::Record(Record::new("Point", fields)),
    ]);

    let document = build_tree(&value);
    let children = &document.root().children;

    assert_eq!(children[0], text(ITEM, "true"));

    let Node::Element(point) = &children[1] else {
        panic!("expected an element");
    };

    assert_eq!(point.name, ITEM);
    assert_eq!(point.attributes, [("type".to_owned(), "Point".to_owned())]);
    assert_eq!(point.children, [text("x", "1")]);
}

#[test]
fn invalid_names_become_keyed_items() {
    let value: Value =
        [("1st", Value::from(1)), ("two words", Value::from(2))]
            .into_iter()
            .collect();

    assert_eq!(
        compact(&value),
        format!(
            "{DECLARATION}\n<root><item key=\"1st\">1</item><item key=\"two \
             words\">2</item></root>\n"
        )
    );
}

#[test]
fn xml_names() {
    assert!(is_xml_name("name"));
    assert!(is_xml_name("_private"));
    assert!(is_xml_name("dotted.name-1"));
    assert!(is_xml_name("ÿes"));
    assert!(is_xml_name("a·b"));
    assert!(is_xml_name("ünïcode"));

    assert!(!is_xml_name(""));
    assert!(!is_xml_name("1st"));
    assert!(!is_xml_name("XMLish"));
    assert!(!is_xml_name("ns:tag"));
    assert!(!is_xml_name("with space"));

    // letters outside the name ranges
    assert!(!is_xml_name("ª"));
    assert!(!is_xml_name("µ"));
    assert!(!is_xml_name("º"));
    assert!(!is_xml_name("aª"));
    assert!(!is_xml_name("·b"));
    assert!(!is_xml_name("a\u{1}"));
}

#[test]
fn xml_chars() {
    assert!(is_xml_char('\t'));
    assert!(is_xml_char('\n'));
    assert!(is_xml_char('\r'));
    assert!(is_xml_char(' '));
    assert!(is_xml_char('é'));
    assert!(is_xml_char('\u{10000}'));

    assert!(!is_xml_char('\u{0}'));
    assert!(!is_xml_char('\u{1}'));
    assert!(!is_xml_char('\u{1F}'));
    assert!(!is_xml_char('\u{FFFE}'));
    assert!(!is_xml_char('\u{FFFF}'));
}

#[test]
fn render_rejects_forbidden_characters() {
    let note: Value =
        [("note", Value::from("a\u{1}b\u{0}"))].into_iter().collect();
    assert!(matches!(
        render(&build_tree(&note), None),
        Err(RenderError::ForbiddenCharacter('\u{1}'))
    ));

    // the key lands in an attribute value
    let key: Value = [("a\u{8}", Value::from(1))].into_iter().collect();
    assert!(matches!(
        render(&build_tree(&key), Some(2)),
        Err(RenderError::ForbiddenCharacter('\u{8}'))
    ));

    let record = Value::Record(Record::new("Bell\u{7}", Mapping::new()));
    assert!(matches!(
        render(&build_tree(&record), None),
        Err(RenderError::ForbiddenCharacter('\u{7}'))
    ));

    // tab and line breaks are kept
    let value: Value =
        [("note", Value::from("a\tb\r\nc"))].into_iter().collect();
    assert_eq!(
        compact(&value),
        format!("{DECLARATION}\n<root><note>a\tb\r\nc</note></root>\n")
    );
}

#[test]
fn render_rejects_invalid_names() {
    let document = Document::new(Element {
        name: "1st".to_owned(),
        attributes: Vec::new(),
        children: Vec::new(),
    });
    assert!(matches!(
        render(&document, None),
        Err(RenderError::InvalidName(name)) if name == "1st"
    ));

    let document = Document::new(Element {
        name: ROOT.to_owned(),
        attributes: vec![("a b".to_owned(), "c".to_owned())],
        children: Vec::new(),
    });
    assert!(matches!(
        render(&document, None),
        Err(RenderError::InvalidName(name)) if name == "a b"
    ));
}

#[test]
fn render_escapes_text() {
    let value: Value =
        [("expr", Value::from("a < b & c > d"))].into_iter().collect();

    assert_eq!(
        compact(&value),
        format!(
            "{DECLARATION}\n<root><expr>a &lt; b &amp; c &gt; d</expr></root>\n"
        )
    );
}

#[test]
fn render_scalars_and_empty_elements() {
    assert_eq!(
        compact(&Value::from(2.5)),
        format!("{DECLARATION}\n<root>2.5</root>\n")
    );
    assert_eq!(compact(&Value::from("")), format!("{DECLARATION}\n<root/>\n"));
    assert_eq!(
        compact(&Value::Sequence(vec![Value::from(1), Value::from(2)])),
        format!("{DECLARATION}\n<root><item>1</item><item>2</item></root>\n")
    );
}

#[test]
fn render_indented() {
    let value: Value =
        [("name", Value::from("a")), ("count", Value::from(3))]
            .into_iter()
            .collect();

    let rendered = render(&build_tree(&value), Some(2)).unwrap();

    assert!(rendered.starts_with(&format!("{DECLARATION}\n<root>")));
    assert!(rendered.contains("\n  <name>a</name>\n  <count>3</count>\n"));
    assert!(rendered.ends_with("</root>\n"));
}
