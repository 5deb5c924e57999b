//! Sizing over HTTP.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};

use crate::error::{GlossarizeError, SizingError};
use crate::sizing::{self, OCTET_STREAM, Sizer, Sizing};

const FILE_SCHEME: &str = "file://";

/// Sizes resources by asking the server, downloading only when it has to.
///
/// A HEAD request is tried first. If the server reports a length for a
/// content type that is neither an archive nor opaque binary, the headers
/// are enough. Otherwise the body is downloaded, bounded by the timeout,
/// and sniffed.
///
/// `file://` URIs are read straight from disk and sniffed the same way.
///
/// The client is owned by the sizer and released when it is dropped.
pub struct HttpSizer {
    client: Client,
    timeout_secs: u64,
}

impl HttpSizer {
    pub fn new(timeout_secs: u64) -> Result<Self, GlossarizeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("datablocks/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }

    fn translate(&self, uri: &str, err: reqwest::Error) -> SizingError {
        if err.is_timeout() {
            SizingError::TimedOut {
                uri: uri.to_string(),
                seconds: self.timeout_secs,
            }
        } else {
            SizingError::http(uri, err.to_string())
        }
    }

    fn size_from_head(&self, uri: &str) -> Option<Sizing> {
        let response = match self.client.head(uri).send() {
            Ok(r) => r,
            Err(e) => {
                log::debug!("{}: HEAD failed ({}), downloading instead", uri, e);
                return None;
            }
        };
        if !response.status().is_success() {
            return None;
        }
        let mimetype = content_type(response.headers())?;
        if mimetype == OCTET_STREAM || sizing::is_archive_mimetype(&mimetype) {
            return None;
        }
        let length = declared_length(response.headers())?;
        log::debug!("{}: sized from headers ({} bytes, {})", uri, length, mimetype);
        Some(sizing::from_headers(uri, &mimetype, length))
    }

    fn download(&self, uri: &str) -> Result<(Option<String>, Vec<u8>), SizingError> {
        let response = self
            .client
            .get(uri)
            .send()
            .map_err(|e| self.translate(uri, e))?;
        if !response.status().is_success() {
            return Err(SizingError::http(uri, format!("HTTP {}", response.status())));
        }
        let mimetype = content_type(response.headers());
        let bytes = response.bytes().map_err(|e| self.translate(uri, e))?;
        Ok((mimetype, bytes.to_vec()))
    }
}

impl Sizer for HttpSizer {
    fn size(&self, uri: &str) -> Result<Vec<Sizing>, SizingError> {
        if let Some(path) = uri.strip_prefix(FILE_SCHEME) {
            return read_local(uri, path);
        }
        if let Some(sizing) = self.size_from_head(uri) {
            return Ok(vec![sizing]);
        }
        let (mimetype, body) = self.download(uri)?;
        sizing::sniff(uri, mimetype.as_deref(), &body)
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

fn read_local(uri: &str, path: &str) -> Result<Vec<Sizing>, SizingError> {
    let body = std::fs::read(path).map_err(|source| SizingError::Io {
        uri: uri.to_string(),
        source,
    })?;
    sizing::sniff(uri, None, &body)
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(sizing::essence)
        .filter(|m| !m.is_empty())
}

// Read the header directly: the body of a HEAD response is always empty.
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
