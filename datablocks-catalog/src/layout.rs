//! Paths inside a catalog root.
//!
//! ```text
//! root/
//!   .catalog-index.json          resource URI -> slug assignments
//!   catalog/<slug>/datapackage.json
//!   catalog/<slug>/data.<ext>    written later by the depositor
//!   tasks/<slug>/depositor.py
//!   tasks/<slug>/depositor.outputs.json
//!   tasks/<slug>/transform.py    only when a transform is needed
//!   .airflow/airscooter.yml
//!   .airflow/dags/<workflow>_dag.py
//! ```

use std::path::{Path, PathBuf};

use crate::error::CatalogError;

pub const CATALOG_DIR: &str = "catalog";
pub const TASKS_DIR: &str = "tasks";
pub const AIRFLOW_DIR: &str = ".airflow";
pub const INDEX_FILE: &str = ".catalog-index.json";
pub const DATAPACKAGE_FILE: &str = "datapackage.json";

/// Suffix of the sidecar file declaring a task script's outputs
/// (`depositor.py` -> `depositor.outputs.json`).
pub const OUTPUTS_SIDECAR_SUFFIX: &str = "outputs.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLayout {
    root: PathBuf,
}

impl CatalogLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root if needed and resolve it to an absolute path, so the
    /// paths baked into generated scripts do not depend on the caller's cwd.
    pub fn open(root: &Path) -> Result<Self, CatalogError> {
        std::fs::create_dir_all(root).map_err(|e| CatalogError::io(root, e))?;
        let root = std::fs::canonicalize(root).map_err(|e| CatalogError::io(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join(CATALOG_DIR)
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join(TASKS_DIR)
    }

    pub fn airflow_dir(&self) -> PathBuf {
        self.root.join(AIRFLOW_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn catalog_slug_dir(&self, slug: &str) -> PathBuf {
        self.catalog_dir().join(slug)
    }

    pub fn task_slug_dir(&self, slug: &str) -> PathBuf {
        self.tasks_dir().join(slug)
    }

    pub fn datapackage_path(&self, slug: &str) -> PathBuf {
        self.catalog_slug_dir(slug).join(DATAPACKAGE_FILE)
    }

    /// Ensure `catalog/` and `tasks/` exist. Idempotent.
    pub fn ensure(&self) -> Result<(), CatalogError> {
        for dir in [self.catalog_dir(), self.tasks_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| CatalogError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Slug folder names directly under `dir`, sorted. Files are ignored and
    /// a missing directory yields an empty list.
    pub fn list_slugs(dir: &Path) -> Result<Vec<String>, CatalogError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut slugs: Vec<String> = std::fs::read_dir(dir)
            .map_err(|e| CatalogError::io(dir, e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        slugs.sort();
        Ok(slugs)
    }
}

/// Sidecar path for a task script: `<dir>/<stem>.outputs.json`.
pub fn outputs_sidecar(script: &Path) -> PathBuf {
    let stem = script
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    script.with_file_name(format!("{stem}.{OUTPUTS_SIDECAR_SUFFIX}"))
}
