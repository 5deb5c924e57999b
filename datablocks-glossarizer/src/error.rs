use datablocks_catalog::StoreError;
use thiserror::Error;

/// Why a resource could not be sized.
///
/// Everything but [`SizingError::Fatal`] is local to one resource: the
/// driver records it on the resource and moves on.
#[derive(Debug, Error)]
pub enum SizingError {
    /// The download did not finish within the wall-clock limit.
    #[error("{uri}: timed out after {seconds}s")]
    TimedOut { uri: String, seconds: u64 },

    /// The body looked like an archive but could not be read as one.
    #[error("{uri}: unreadable archive: {reason}")]
    BadArchive { uri: String, reason: String },

    #[error("{uri}: {message}")]
    Http { uri: String, message: String },

    #[error("{uri}: I/O error: {source}")]
    Io {
        uri: String,
        source: std::io::Error,
    },

    /// The sizer cannot go on at all; the run stops after flushing.
    #[error("sizing aborted: {0}")]
    Fatal(String),
}

impl SizingError {
    pub fn http(uri: &str, message: impl Into<String>) -> Self {
        Self::Http {
            uri: uri.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_archive(uri: &str, reason: impl ToString) -> Self {
        Self::BadArchive {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

#[derive(Debug, Error)]
pub enum GlossarizeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Sizing(SizingError),
}
