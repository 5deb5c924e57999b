use super::*;
use std::fs;
use tempfile::TempDir;

// -- Python / notebook literal --

#[test]
fn test_python_list_variants() {
    assert_eq!(parse_python_declaration(r#"outputs = ["a.csv"]"#).unwrap(), vec!["a.csv"]);
    assert_eq!(
        parse_python_declaration(r#"  files=['a.csv', "b c.csv",]  "#).unwrap(),
        vec!["a.csv", "b c.csv"]
    );
    assert!(parse_python_declaration("outputs = []").unwrap().is_empty());
}

#[test]
fn test_python_escapes_and_equals_in_items() {
    assert_eq!(
        parse_python_declaration(r#"outputs = ["q?x=1", 'it\'s', "back\\slash"]"#).unwrap(),
        vec!["q?x=1", "it's", "back\\slash"]
    );
}

#[test]
fn test_python_rejects_non_literals() {
    assert!(matches!(
        parse_python_declaration("print(outputs)"),
        Err(OutputParseError::NotADeclaration(_))
    ));
    assert!(matches!(
        parse_python_declaration("outputs = [path]"),
        Err(OutputParseError::Malformed(_))
    ));
    assert!(matches!(
        parse_python_declaration(r#"outputs = ["a" "b"]"#),
        Err(OutputParseError::Malformed(_))
    ));
    assert!(matches!(
        parse_python_declaration(r#"outputs = ["a"#),
        Err(OutputParseError::Malformed(_))
    ));
    assert!(matches!(
        parse_python_declaration(r#"out.puts = ["a"]"#),
        Err(OutputParseError::NotADeclaration(_))
    ));
}

// -- Shell arrays --

#[test]
fn test_shell_array_quoting() {
    assert_eq!(
        parse_shell_declaration(r#"OUTPUTS=(a.csv "b c.csv" 'd $x.csv' e\ f.csv)"#).unwrap(),
        vec!["a.csv", "b c.csv", "d $x.csv", "e f.csv"]
    );
    assert!(parse_shell_declaration("outputs=()").unwrap().is_empty());
}

#[test]
fn test_shell_rejects_plain_assignment() {
    assert!(matches!(
        parse_shell_declaration("outputs=a.csv"),
        Err(OutputParseError::Malformed(_))
    ));
    assert!(matches!(
        parse_shell_declaration(r#"outputs=("a.csv)"#),
        Err(OutputParseError::Malformed(_))
    ));
}

// -- Whole files --

#[test]
fn test_last_non_blank_line_of_script() {
    let tmp = TempDir::new().unwrap();
    let script = tmp.path().join("depositor.py");
    fs::write(&script, "import requests\noutputs = ['x.csv']\n\n\n").unwrap();
    assert_eq!(declared_outputs(&script).unwrap(), vec!["x.csv"]);

    let sh = tmp.path().join("transform.sh");
    fs::write(&sh, "#!/bin/bash\ncp a b\noutputs=(\"/abs/b.csv\")\n").unwrap();
    assert_eq!(declared_outputs(&sh).unwrap(), vec!["/abs/b.csv"]);
}

#[test]
fn test_notebook_last_cell() {
    let tmp = TempDir::new().unwrap();
    let nb = tmp.path().join("transform.ipynb");
    let doc = serde_json::json!({
        "cells": [
            {"cell_type": "code", "source": "# TODO: check\nimport pandas"},
            {"cell_type": "code", "source": ["df.to_csv('out.csv')\n", "outputs = ['out.csv']"]}
        ],
        "nbformat": 4
    });
    fs::write(&nb, doc.to_string()).unwrap();
    assert_eq!(declared_outputs(&nb).unwrap(), vec!["out.csv"]);
    assert!(is_incomplete(&nb).unwrap());
}

#[test]
fn test_sidecar_wins_over_last_line() {
    let tmp = TempDir::new().unwrap();
    let script = tmp.path().join("depositor.py");
    fs::write(&script, "outputs = ['from-source.csv']\n").unwrap();
    fs::write(tmp.path().join("depositor.outputs.json"), r#"["from-sidecar.csv"]"#).unwrap();
    assert_eq!(declared_outputs(&script).unwrap(), vec!["from-sidecar.csv"]);

    fs::write(tmp.path().join("depositor.outputs.json"), "{}").unwrap();
    assert!(matches!(declared_outputs(&script), Err(OutputParseError::Sidecar(_))));
}

#[test]
fn test_empty_and_unsupported_scripts() {
    let tmp = TempDir::new().unwrap();
    let empty = tmp.path().join("depositor.py");
    fs::write(&empty, "\n  \n").unwrap();
    assert!(matches!(declared_outputs(&empty), Err(OutputParseError::Empty)));

    let r = tmp.path().join("depositor.R");
    fs::write(&r, "outputs <- c('a')\n").unwrap();
    assert!(matches!(declared_outputs(&r), Err(OutputParseError::UnsupportedScript)));
}

#[test]
fn test_incomplete_marker_only_on_first_line() {
    let tmp = TempDir::new().unwrap();
    let stub = tmp.path().join("transform.py");
    fs::write(&stub, "# TODO: Finish implementing!\noutputs = []\n").unwrap();
    assert!(is_incomplete(&stub).unwrap());

    fs::write(&stub, "import csv\n# TODO: tidy up\noutputs = []\n").unwrap();
    assert!(!is_incomplete(&stub).unwrap());
}

#[test]
fn test_script_kind_from_extension() {
    assert_eq!(ScriptKind::from_path(Path::new("a/depositor.py")), Some(ScriptKind::Python));
    assert_eq!(ScriptKind::from_path(Path::new("transform.sh")), Some(ScriptKind::Shell));
    assert_eq!(ScriptKind::from_path(Path::new("x.ipynb")), Some(ScriptKind::Notebook));
    assert_eq!(ScriptKind::from_path(Path::new("depositor.outputs.json")), None);
    assert_eq!(ScriptKind::from_path(Path::new("depositor")), None);
}
