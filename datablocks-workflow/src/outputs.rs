//! Reading the outputs a task script declares.
//!
//! A script `<stem>.<ext>` declares its outputs either in a sidecar file
//! `<stem>.outputs.json` (a JSON array of paths) or, failing that, on its
//! last line:
//!
//! ```text
//! outputs = ["a.csv", 'b.csv']          # .py, and the last cell of an .ipynb
//! outputs=(a.csv "b c.csv" 'd.csv')     # .sh
//! ```
//!
//! Declarations are parsed as literals. Scripts are never run.

use std::path::Path;

use datablocks_catalog::layout::outputs_sidecar;
use datablocks_catalog::materialize::INCOMPLETE_MARKER;
use serde::Deserialize;

use crate::error::OutputParseError;

/// Task script flavours the workflow knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    Python,
    Shell,
    Notebook,
}

impl ScriptKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "py" => Some(Self::Python),
            "sh" => Some(Self::Shell),
            "ipynb" => Some(Self::Notebook),
            _ => None,
        }
    }
}

/// Outputs declared by `script`, sidecar first.
pub fn declared_outputs(script: &Path) -> Result<Vec<String>, OutputParseError> {
    let sidecar = outputs_sidecar(script);
    if sidecar.is_file() {
        let contents = std::fs::read_to_string(&sidecar)?;
        return serde_json::from_str(&contents).map_err(OutputParseError::Sidecar);
    }

    let kind = ScriptKind::from_path(script).ok_or(OutputParseError::UnsupportedScript)?;
    let source = script_source(script, kind)?;
    let last = source
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or(OutputParseError::Empty)?;

    match kind {
        ScriptKind::Python | ScriptKind::Notebook => parse_python_declaration(last),
        ScriptKind::Shell => parse_shell_declaration(last),
    }
}

/// True when the script still starts with the stub marker written at
/// materialization time.
pub fn is_incomplete(script: &Path) -> Result<bool, OutputParseError> {
    let kind = ScriptKind::from_path(script).ok_or(OutputParseError::UnsupportedScript)?;
    let source = match kind {
        ScriptKind::Notebook => first_cell_source(script)?,
        _ => std::fs::read_to_string(script)?,
    };
    Ok(source
        .lines()
        .next()
        .is_some_and(|l| l.trim_start().starts_with(INCOMPLETE_MARKER)))
}

// ── Source extraction ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct Cell {
    #[serde(default)]
    source: CellSource,
}

/// nbformat allows a cell source to be one string or a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Lines(Vec::new())
    }
}

impl CellSource {
    fn into_text(self) -> String {
        match self {
            CellSource::Text(s) => s,
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

fn read_notebook(path: &Path) -> Result<Notebook, OutputParseError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(OutputParseError::Notebook)
}

fn script_source(script: &Path, kind: ScriptKind) -> Result<String, OutputParseError> {
    match kind {
        ScriptKind::Notebook => {
            let notebook = read_notebook(script)?;
            Ok(notebook
                .cells
                .into_iter()
                .last()
                .map(|c| c.source.into_text())
                .unwrap_or_default())
        }
        _ => Ok(std::fs::read_to_string(script)?),
    }
}

fn first_cell_source(script: &Path) -> Result<String, OutputParseError> {
    let notebook = read_notebook(script)?;
    Ok(notebook
        .cells
        .into_iter()
        .next()
        .map(|c| c.source.into_text())
        .unwrap_or_default())
}

// ── Declaration parsers ─────────────────────────────────────────────────────

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// `<identifier> = [<string>, ...]`
pub(crate) fn parse_python_declaration(line: &str) -> Result<Vec<String>, OutputParseError> {
    let (lhs, rhs) = line
        .split_once('=')
        .ok_or_else(|| OutputParseError::NotADeclaration(line.trim().to_string()))?;
    if !is_identifier(lhs.trim()) {
        return Err(OutputParseError::NotADeclaration(line.trim().to_string()));
    }
    parse_python_list(rhs.trim())
}

/// A Python list literal whose items are all plain string literals.
fn parse_python_list(src: &str) -> Result<Vec<String>, OutputParseError> {
    let inner = src
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| OutputParseError::malformed(format!("expected [...], got {src}")))?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(quote) = chars.next() else { break };
        if quote != '"' && quote != '\'' {
            return Err(OutputParseError::malformed(format!(
                "expected a string literal, found {quote:?}"
            )));
        }

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err(OutputParseError::malformed("unterminated string")),
                Some(c) if c == quote => break,
                Some('\\') => match chars.next() {
                    Some('n') => item.push('\n'),
                    Some('t') => item.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => item.push(c),
                    Some(c) => {
                        item.push('\\');
                        item.push(c);
                    }
                    None => return Err(OutputParseError::malformed("unterminated string")),
                },
                Some(c) => item.push(c),
            }
        }
        items.push(item);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => {
                return Err(OutputParseError::malformed(format!(
                    "expected ',' between items, found {c:?}"
                )));
            }
        }
    }
    Ok(items)
}

/// `NAME=(word word ...)`, words optionally single- or double-quoted.
pub(crate) fn parse_shell_declaration(line: &str) -> Result<Vec<String>, OutputParseError> {
    let trimmed = line.trim();
    let (name, rest) = trimmed
        .split_once('=')
        .ok_or_else(|| OutputParseError::NotADeclaration(trimmed.to_string()))?;
    if !is_identifier(name) {
        return Err(OutputParseError::NotADeclaration(trimmed.to_string()));
    }
    let body = rest
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| OutputParseError::malformed(format!("expected (...), got {rest}")))?;
    shell_words(body)
}

fn shell_words(src: &str) -> Result<Vec<String>, OutputParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = src.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(OutputParseError::malformed("unterminated ' quote")),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\' | '$' | '`')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(OutputParseError::malformed("unterminated \" quote")),
                        },
                        Some(c) => current.push(c),
                        None => return Err(OutputParseError::malformed("unterminated \" quote")),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
#[path = "tests/outputs_tests.rs"]
mod tests;
