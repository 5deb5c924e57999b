//! Prune catalog entries that are not complete.
//!
//! Deletion is permanent. Task folders removed here may still be referenced
//! by an existing workflow file, so rebuild the DAG afterwards.

use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::layout::CatalogLayout;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Slugs deleted from both `catalog/` and `tasks/`.
    pub removed: Vec<String>,
    /// Slugs with a complete manifest.
    pub kept: Vec<String>,
    /// Slugs left in place because their manifest is missing or unreadable,
    /// with the reason.
    pub unreadable: Vec<(String, String)>,
}

/// Only the field the finalizer cares about.
#[derive(Deserialize)]
struct Completeness {
    complete: bool,
}

/// Remove every `catalog/<slug>` whose manifest says `complete: false`,
/// together with its `tasks/<slug>`.
pub fn finalize(root: &Path) -> Result<FinalizeReport, CatalogError> {
    let layout = CatalogLayout::new(root);
    let mut report = FinalizeReport::default();

    for slug in CatalogLayout::list_slugs(&layout.catalog_dir())? {
        let manifest = layout.datapackage_path(&slug);
        let complete = match read_completeness(&manifest) {
            Ok(c) => c,
            Err(reason) => {
                log::warn!("{}: leaving in place, {}", slug, reason);
                report.unreadable.push((slug, reason));
                continue;
            }
        };

        if complete {
            report.kept.push(slug);
            continue;
        }

        let task_dir = layout.task_slug_dir(&slug);
        if task_dir.exists() {
            std::fs::remove_dir_all(&task_dir).map_err(|e| CatalogError::io(&task_dir, e))?;
        }
        let catalog_dir = layout.catalog_slug_dir(&slug);
        std::fs::remove_dir_all(&catalog_dir).map_err(|e| CatalogError::io(&catalog_dir, e))?;
        log::debug!("{}: removed incomplete entry", slug);
        report.removed.push(slug);
    }

    log::info!(
        "Finalized catalog: {} kept, {} removed, {} unreadable",
        report.kept.len(),
        report.removed.len(),
        report.unreadable.len()
    );
    Ok(report)
}

fn read_completeness(manifest: &Path) -> Result<bool, String> {
    let contents = std::fs::read_to_string(manifest)
        .map_err(|e| format!("cannot read {}: {}", manifest.display(), e))?;
    let parsed: Completeness = serde_json::from_str(&contents)
        .map_err(|e| format!("cannot parse {}: {}", manifest.display(), e))?;
    Ok(parsed.complete)
}
