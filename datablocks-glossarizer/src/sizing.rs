//! Sizing: what a resource URI turns out to contain once fetched.
//!
//! A plain file yields one [`Sizing`] with `dataset = "."`. A ZIP archive
//! yields one per member file, with `dataset` set to the member path.

use std::io::Cursor;
use std::path::Path;

use datablocks_core::STANDALONE_DATASET;

use crate::error::SizingError;

pub const HTML_MIMETYPE: &str = "text/html";
pub const OCTET_STREAM: &str = "application/octet-stream";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Known extension <-> MIME type pairs. The first pair for a MIME type wins
/// when mapping back to an extension.
const FORMATS: &[(&str, &str)] = &[
    ("csv", "text/csv"),
    ("geojson", "application/vnd.geo+json"),
    ("json", "application/json"),
    ("zip", "application/zip"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("pdf", "application/pdf"),
    ("html", HTML_MIMETYPE),
    ("htm", HTML_MIMETYPE),
    ("txt", "text/plain"),
    ("xml", "application/xml"),
    ("kml", "application/vnd.google-earth.kml+xml"),
    ("kmz", "application/vnd.google-earth.kmz"),
];

/// Other spellings servers use.
const MIMETYPE_ALIASES: &[(&str, &str)] = &[
    ("application/x-zip-compressed", "zip"),
    ("application/x-zip", "zip"),
    ("application/geo+json", "geojson"),
    ("application/csv", "csv"),
    ("text/comma-separated-values", "csv"),
    ("text/xml", "xml"),
];

/// Size and type of one dataset found at a resource URI.
#[derive(Debug, Clone, PartialEq)]
pub struct Sizing {
    /// Size in KiB (uncompressed, for archive members).
    pub filesize_kib: f64,
    pub dataset: String,
    pub mimetype: String,
    /// Lowercase, no dot. Empty when unknown.
    pub extension: String,
}

impl Sizing {
    pub fn is_html(&self) -> bool {
        self.mimetype == HTML_MIMETYPE || self.extension == "html" || self.extension == "htm"
    }
}

/// Something that can fetch and size a resource URI.
pub trait Sizer {
    fn size(&self, uri: &str) -> Result<Vec<Sizing>, SizingError>;

    /// Wall-clock limit per resource, recorded in timeout sentinels.
    fn timeout_secs(&self) -> u64;
}

/// `text/csv; charset=utf-8` -> `text/csv`
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn extension_for_mimetype(mimetype: &str) -> Option<&'static str> {
    FORMATS
        .iter()
        .find(|(_, m)| *m == mimetype)
        .map(|(e, _)| *e)
        .or_else(|| MIMETYPE_ALIASES.iter().find(|(m, _)| *m == mimetype).map(|(_, e)| *e))
}

pub fn mimetype_for_extension(extension: &str) -> &'static str {
    FORMATS
        .iter()
        .find(|(e, _)| *e == extension)
        .map(|(_, m)| *m)
        .unwrap_or(OCTET_STREAM)
}

pub fn is_archive_mimetype(mimetype: &str) -> bool {
    extension_for_mimetype(mimetype) == Some("zip")
}

/// Lowercased extension of the last path segment of `uri`, ignoring any
/// query string or fragment.
pub fn extension_from_uri(uri: &str) -> Option<String> {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    Path::new(segment)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

pub fn looks_like_html(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head: Vec<u8> = bytes[start..]
        .iter()
        .take(16)
        .map(|b| b.to_ascii_lowercase())
        .collect();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}

fn kib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// Sizing for a response known only from its headers.
pub fn from_headers(uri: &str, mimetype: &str, length: u64) -> Sizing {
    let extension = extension_for_mimetype(mimetype)
        .map(str::to_string)
        .or_else(|| extension_from_uri(uri))
        .unwrap_or_default();
    Sizing {
        filesize_kib: kib(length),
        dataset: STANDALONE_DATASET.to_string(),
        mimetype: mimetype.to_string(),
        extension,
    }
}

/// Size a downloaded body. `declared` is the response's content type, if any.
pub fn sniff(uri: &str, declared: Option<&str>, body: &[u8]) -> Result<Vec<Sizing>, SizingError> {
    if body.starts_with(ZIP_MAGIC) {
        return list_archive(uri, body);
    }
    if declared.is_some_and(is_archive_mimetype) {
        return Err(SizingError::bad_archive(uri, "declared as ZIP but has no ZIP header"));
    }

    if declared == Some(HTML_MIMETYPE) || looks_like_html(body) {
        return Ok(vec![Sizing {
            filesize_kib: kib(body.len() as u64),
            dataset: STANDALONE_DATASET.to_string(),
            mimetype: HTML_MIMETYPE.to_string(),
            extension: "html".to_string(),
        }]);
    }

    let from_uri = extension_from_uri(uri);
    let mimetype = match declared {
        Some(m) if m != OCTET_STREAM => m.to_string(),
        _ => from_uri
            .as_deref()
            .map(mimetype_for_extension)
            .unwrap_or(OCTET_STREAM)
            .to_string(),
    };
    let extension = extension_for_mimetype(&mimetype)
        .map(str::to_string)
        .or(from_uri)
        .unwrap_or_default();

    Ok(vec![Sizing {
        filesize_kib: kib(body.len() as u64),
        dataset: STANDALONE_DATASET.to_string(),
        mimetype,
        extension,
    }])
}

/// One sizing per file member of a ZIP archive. Directory entries are skipped.
pub fn list_archive(uri: &str, body: &[u8]) -> Result<Vec<Sizing>, SizingError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(body)).map_err(|e| SizingError::bad_archive(uri, e))?;

    let mut sizings = Vec::new();
    for i in 0..archive.len() {
        let member = archive.by_index(i).map_err(|e| SizingError::bad_archive(uri, e))?;
        if member.is_dir() {
            continue;
        }
        let name = member.name().to_string();
        let extension = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        sizings.push(Sizing {
            filesize_kib: kib(member.size()),
            dataset: name,
            mimetype: mimetype_for_extension(&extension).to_string(),
            extension,
        });
    }
    log::debug!("{}: archive with {} member files", uri, sizings.len());
    Ok(sizings)
}

#[cfg(test)]
#[path = "tests/sizing_tests.rs"]
mod tests;
