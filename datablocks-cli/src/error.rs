use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be read or written
    #[error("Config error: {0}")]
    Settings(#[from] datablocks_core::settings::SettingsError),

    /// Resource or glossary file error
    #[error("{0}")]
    Store(#[from] datablocks_catalog::StoreError),

    /// Catalog materialization or finalization failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] datablocks_catalog::CatalogError),

    /// DAG build failed as a whole
    #[error("Workflow error: {0}")]
    Workflow(#[from] datablocks_workflow::WorkflowError),

    /// Glossarization stopped
    #[error("Glossarize error: {0}")]
    Glossarize(#[from] datablocks_glossarizer::GlossarizeError),

    /// Some task folders could not be added to the DAG
    #[error("{0} task folder(s) could not be added to the workflow")]
    TaskDefinitions(usize),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
