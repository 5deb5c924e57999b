//! Data-package manifests (`catalog/<slug>/datapackage.json`).
//!
//! A manifest is derived from a single glossary entry. Licensing and
//! contributor fields start empty for manual curation. `complete` marks
//! entries that are usable as soon as the depositor has run.

use std::collections::BTreeMap;

use datablocks_core::{Filesize, GlossaryEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::slug::slugify;

pub const DATAPACKAGE_VERSION: &str = "1.0-beta";
pub const VERSION_PLACEHOLDER: &str = "N/A";

/// How the `path` of a complete manifest's single resource is named.
///
/// The generated depositor saves a standalone file as `data.<format>`, but
/// manifests have always pointed at `data.csv`, including for GeoJSON.
/// Both are kept until that is settled; [`make_package`] uses `Legacy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManifestPath {
    /// Always `data.csv`.
    #[default]
    Legacy,
    /// `data.<preferred_format>`, matching the depositor's output.
    FormatExtension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSource {
    pub name: String,
    pub web: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageResource {
    pub path: String,
    pub url: String,
}

/// Manifest schema. Every key is always present; absent glossary values
/// serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPackage {
    pub name: String,
    pub datapackage_version: String,
    pub title: String,
    pub version: String,
    pub keywords: Vec<String>,
    pub description: String,
    pub licenses: Vec<Value>,
    pub sources: Vec<PackageSource>,
    pub contributors: Vec<Value>,
    pub maintainers: Vec<Value>,
    pub publishers: Vec<Value>,
    pub dependencies: BTreeMap<String, Value>,
    pub resources: Vec<PackageResource>,
    pub views: Vec<Value>,

    pub rows: Option<Value>,
    pub columns: Option<Value>,
    pub filesize: Option<Filesize>,
    pub available_formats: Option<Vec<String>>,

    pub page_views: Option<Value>,
    pub preferred_mimetype: Option<String>,
    pub topics_provided: Vec<String>,
    pub preferred_format: Option<String>,
    pub column_names: Vec<String>,
    pub landing_page: Option<String>,
    pub last_updated: Option<String>,
    pub protocol: Option<String>,
    pub created: Option<String>,

    pub complete: bool,
}

/// Build the manifest for `entry` with the legacy `data.csv` resource path.
pub fn make_package(entry: &GlossaryEntry) -> DataPackage {
    make_package_with(entry, ManifestPath::Legacy)
}

pub fn make_package_with(entry: &GlossaryEntry, path_policy: ManifestPath) -> DataPackage {
    let record = &entry.record;
    let complete = entry.is_ready();

    let resources = if complete {
        let path = match (path_policy, entry.preferred_format.as_deref()) {
            (ManifestPath::FormatExtension, Some(format)) => format!("data.{format}"),
            _ => "data.csv".to_string(),
        };
        vec![PackageResource {
            path,
            url: record.resource.clone(),
        }]
    } else {
        Vec::new()
    };

    DataPackage {
        name: slugify(&record.name),
        datapackage_version: DATAPACKAGE_VERSION.to_string(),
        title: record.name.clone(),
        version: VERSION_PLACEHOLDER.to_string(),
        keywords: record.keywords_provided.clone(),
        description: record.description.clone(),
        licenses: Vec::new(),
        sources: record
            .sources
            .iter()
            .map(|s| PackageSource {
                name: s.clone(),
                web: record.landing_page.clone(),
            })
            .collect(),
        contributors: Vec::new(),
        maintainers: Vec::new(),
        publishers: Vec::new(),
        dependencies: BTreeMap::new(),
        resources,
        views: Vec::new(),
        rows: entry.rows.clone(),
        columns: entry.columns.clone(),
        filesize: entry.filesize.clone(),
        available_formats: entry.available_formats.clone(),
        page_views: record.page_views.clone(),
        preferred_mimetype: entry.preferred_mimetype.clone(),
        topics_provided: record.topics_provided.clone(),
        preferred_format: entry.preferred_format.clone(),
        column_names: record.column_names.clone(),
        landing_page: record.landing_page.clone(),
        last_updated: record.last_updated.clone(),
        protocol: record.protocol.clone(),
        created: record.created.clone(),
        complete,
    }
}

#[cfg(test)]
#[path = "tests/datapackage_tests.rs"]
mod tests;
