//! Runs the driver on input files written to a temporary directory.

use std::{fs, process::ExitCode};

use clap::Parser;
use outwrite_driver::{Arguments, Error};
use outwrite_engine::{native, Options};
use outwrite_value::{Mapping, Record, Value};
use tempfile::TempDir;

fn arguments<'a>(args: impl IntoIterator<Item = &'a str>) -> Arguments {
    Arguments::try_parse_from(std::iter::once("outwrite").chain(args)).unwrap()
}

fn input(directory: &TempDir, name: &str, content: &str) -> String {
    let path = directory.path().join(name);
    fs::write(&path, content).unwrap();

    path.to_str().unwrap().to_owned()
}

/// Runs the driver with `-o` pointing into `directory` and returns what was
/// written.
fn execute<'a>(
    directory: &TempDir,
    args: impl IntoIterator<Item = &'a str>,
) -> String {
    let output = directory.path().join("output");

    let mut command = vec!["outwrite".to_owned()];
    command.extend(args.into_iter().map(str::to_owned));
    command.extend(["-o".to_owned(), output.display().to_string()]);

    let arguments = Arguments::try_parse_from(command).unwrap();
    outwrite_driver::execute(&arguments).unwrap();

    fs::read_to_string(output).unwrap()
}

fn failure<'a>(args: impl IntoIterator<Item = &'a str>) -> Error {
    outwrite_driver::execute(&arguments(args)).unwrap_err()
}

#[test]
fn json_to_tabular() {
    let directory = tempfile::tempdir().unwrap();
    let path = input(&directory, "subject.json", r#"{"a": 1, "b": 2}"#);

    assert_eq!(execute(&directory, [path.as_str(), "-f", "CSV"]), "a,b\n1,2\n");
    assert_eq!(
        execute(&directory, [
            path.as_str(),
            "-f",
            "tabular",
            "--crlf",
            "--no-header"
        ]),
        "1,2\r\n"
    );
}

#[test]
fn input_order_is_kept() {
    let directory = tempfile::tempdir().unwrap();
    let path = input(
        &directory,
        "subject.JSON",
        r#"{"zeta": [1, 2.5, "x"], "alpha": {"on": true, "off": null}}"#,
    );

    assert_eq!(
        execute(&directory, [path.as_str(), "--format", "json"]),
        r#"{"zeta":[1,2.5,"x"],"alpha":{"on":true}}"#
    );
}

#[test]
fn default_format_is_markup() {
    let directory = tempfile::tempdir().unwrap();

    assert_eq!(
        execute(&directory, ["--set", "name=a"]),
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root><name>a</name></root>\n"
    );
}

#[test]
fn attributes() {
    let directory = tempfile::tempdir().unwrap();

    assert_eq!(
        execute(&directory, [
            "-f",
            "json",
            "-s",
            "name=a",
            "-s",
            "count=3",
            "-s",
            "ratio=0.5",
            "-s",
            "flag=true",
            "-s",
            "quoted=\"3\"",
            "-s",
            "list=[1]",
        ]),
        r#"{"name":"a","count":3,"ratio":0.5,"flag":true,"quoted":"3","list":"[1]"}"#
    );

    let path = input(&directory, "subject.json", r#"{"a": 1, "b": 2}"#);

    assert_eq!(
        execute(&directory, [path.as_str(), "-f", "json", "--set", "a="]),
        r#"{"b":2}"#
    );
    assert_eq!(
        execute(&directory, [path.as_str(), "-f", "json", "--set", "a=x=y"]),
        r#"{"a":"x=y","b":2}"#
    );
}

#[test]
fn records() {
    let directory = tempfile::tempdir().unwrap();

    let text = execute(&directory, [
        "--record", "Point", "--set", "x=1", "--format", "native",
    ]);

    let mut fields = Mapping::new();
    fields.insert("x".to_owned(), Value::from(1));
    let point = Value::Record(Record::new("Point", fields));

    assert_eq!(native::decode(&text).unwrap(), point);

    // a record input keeps its type through attribute assignments
    let path = input(
        &directory,
        "point.ron",
        &native::encode(&point, Options::empty()).unwrap(),
    );

    let text = execute(&directory, [path.as_str(), "-f", "ron", "-s", "y=2"]);
    let record = native::decode(&text).unwrap().into_record().unwrap();

    assert_eq!(record.type_name(), "Point");
    assert_eq!(record.fields().len(), 2);

    assert_eq!(execute(&directory, [path.as_str(), "-f", "json"]), r#"{"x":1}"#);
}

#[test]
fn option_bits() {
    assert_eq!(arguments(["--pretty", "--options", "8"]).option_bits(), 9);
    assert_eq!(
        arguments(["--force-object", "--crlf"]).option_bits(),
        (Options::FORCE_OBJECT | Options::CRLF).bits()
    );
    assert_eq!(arguments([]).option_bits(), 0);
}

#[test]
fn failures() {
    let directory = tempfile::tempdir().unwrap();

    assert!(matches!(
        failure(["-f", "yaml"]),
        Error::Engine(outwrite_engine::Error::UnsupportedFormat(_))
    ));
    assert!(matches!(failure(["-s", "novalue"]), Error::Assignment(_)));
    assert!(matches!(
        failure(["-s", "=1"]),
        Error::Store(outwrite_store::Error::InvalidKey(_))
    ));

    let null = input(&directory, "null.json", "null");
    assert!(matches!(
        failure([null.as_str()]),
        Error::Engine(outwrite_engine::Error::InvalidInput)
    ));

    let scalar = input(&directory, "scalar.json", "3");
    assert!(matches!(
        failure([scalar.as_str(), "-s", "a=1"]),
        Error::Store(outwrite_store::Error::InvalidInput)
    ));

    let nested = input(&directory, "nested.json", r#"{"a": {"b": 1}}"#);
    assert!(matches!(
        failure([nested.as_str(), "-f", "csv"]),
        Error::Engine(outwrite_engine::Error::UnsupportedShape(_))
    ));

    let text = input(&directory, "subject.txt", "{}");
    assert!(matches!(failure([text.as_str()]), Error::UnknownInput(_)));

    let malformed = input(&directory, "malformed.json", "{");
    assert!(matches!(failure([malformed.as_str()]), Error::Json { .. }));

    let malformed = input(&directory, "malformed.ron", "Integer(");
    assert!(matches!(failure([malformed.as_str()]), Error::Native { .. }));

    let missing = directory.path().join("missing.json");
    assert!(matches!(
        failure([missing.to_str().unwrap()]),
        Error::Io { .. }
    ));
}

#[test]
fn run_reports_failure() {
    assert_eq!(
        format!("{:?}", outwrite_driver::run(arguments(["-f", "yaml"]))),
        format!("{:?}", ExitCode::FAILURE)
    );
}
