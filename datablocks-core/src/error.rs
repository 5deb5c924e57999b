use thiserror::Error;

/// A glossary or resource record that does not match the record schema.
///
/// `index` is the record's position in the file it was read from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required key is absent
    #[error("entry {index}: missing required field `{field}`")]
    MissingField { index: usize, field: String },

    /// The entry is present but unusable
    #[error("entry {index}: {message}")]
    Invalid { index: usize, message: String },
}

impl SchemaError {
    pub fn invalid(index: usize, msg: impl Into<String>) -> Self {
        Self::Invalid {
            index,
            message: msg.into(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::MissingField { index, .. } | Self::Invalid { index, .. } => *index,
        }
    }
}
