use datablocks_catalog::CatalogError;
use thiserror::Error;

/// A task folder that cannot contribute a node to the workflow.
///
/// These are collected per slug; the rest of the DAG is still built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDefinitionError {
    #[error("{slug}: no depositor script (.py, .sh or .ipynb)")]
    MissingDepositor { slug: String },

    #[error("{slug}: more than one {role} script: {}", .scripts.join(", "))]
    Ambiguous {
        slug: String,
        role: String,
        scripts: Vec<String>,
    },

    #[error("{slug}: cannot read declared outputs of {script}: {reason}")]
    Outputs {
        slug: String,
        script: String,
        reason: String,
    },
}

impl TaskDefinitionError {
    pub fn slug(&self) -> &str {
        match self {
            Self::MissingDepositor { slug } | Self::Ambiguous { slug, .. } | Self::Outputs { slug, .. } => slug,
        }
    }
}

/// Why a script's output declaration could not be read.
#[derive(Debug, Error)]
pub enum OutputParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported script type")]
    UnsupportedScript,

    #[error("script is empty")]
    Empty,

    #[error("last line is not an output declaration: {0}")]
    NotADeclaration(String),

    #[error("malformed list literal: {0}")]
    Malformed(String),

    #[error("bad notebook JSON: {0}")]
    Notebook(serde_json::Error),

    #[error("bad outputs sidecar: {0}")]
    Sidecar(serde_json::Error),
}

impl OutputParseError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Errors that stop a DAG build as a whole.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no tasks folder at {0}")]
    MissingTasks(String),

    #[error("invalid workflow name {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yml::Error,
    },
}

impl WorkflowError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
