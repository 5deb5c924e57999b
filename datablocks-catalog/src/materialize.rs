//! Glossary -> `catalog/` + `tasks/` folder tree.
//!
//! One folder pair per resolved slug. Each gets a depositor that fetches the
//! resource into `catalog/<slug>/`, a sidecar declaring the depositor's
//! outputs, a `datapackage.json`, and, when the data is not directly usable,
//! a transform stub marked with [`INCOMPLETE_MARKER`].
//!
//! Archive detection is approximate: a resource is treated as an archive when
//! any glossary row for its URI names an inner dataset (`dataset != "."`),
//! which is what sizing produces when it unpacks a ZIP into several rows.
//! Archives are assumed to be ZIP files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use datablocks_core::{Filesize, GlossaryEntry, STANDALONE_DATASET};

use crate::datapackage::make_package;
use crate::error::{CatalogError, StoreError};
use crate::index;
use crate::layout::{CatalogLayout, outputs_sidecar};
use crate::slug::NameResolver;
use crate::store;

/// First line of a transform stub that still needs a human.
pub const INCOMPLETE_MARKER: &str = "# TODO";

pub const DEPOSITOR_SCRIPT: &str = "depositor.py";
pub const TRANSFORM_SCRIPT: &str = "transform.py";

/// Summary of one materialization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Glossary entries read.
    pub entries: usize,
    /// Slugs whose folders were created by this run.
    pub created: Vec<String>,
    /// Slugs whose `catalog/<slug>` already existed and were left alone.
    pub skipped: Vec<String>,
    /// Slugs that received a transform stub.
    pub transforms: Vec<String>,
    /// Entries whose sizing timed out, so their size is only a lower bound.
    pub r#unsized: usize,
}

/// Materialize the glossary file at `glossary_path` under `root`.
///
/// Any malformed entry fails the whole call before anything is written.
pub fn init_catalog(glossary_path: &Path, root: &Path) -> Result<MaterializeReport, CatalogError> {
    let glossary = store::load_glossary(glossary_path).map_err(|e| match e {
        StoreError::Schema { path, source } => {
            log::error!("malformed glossary {}", path);
            CatalogError::Schema(source)
        }
        other => CatalogError::Store(other),
    })?;
    init_catalog_entries(&glossary, root)
}

/// Materialize an in-memory glossary under `root`.
///
/// Entries are handled in order; the first entry for a URI decides its slug
/// and serves as the representative for its manifest. If writing fails,
/// every folder created by this call is removed again.
pub fn init_catalog_entries(
    glossary: &[GlossaryEntry],
    root: &Path,
) -> Result<MaterializeReport, CatalogError> {
    for (i, entry) in glossary.iter().enumerate() {
        entry.validate(i)?;
    }

    let layout = CatalogLayout::open(root)?;
    layout.ensure()?;

    let mut resolver = index::load_resolver(&layout)?;
    let slots = plan_slots(glossary, &mut resolver);

    let mut report = MaterializeReport {
        entries: glossary.len(),
        r#unsized: glossary
            .iter()
            .filter(|e| e.filesize.as_ref().is_some_and(Filesize::is_timeout))
            .count(),
        ..Default::default()
    };
    let mut created_dirs: Vec<PathBuf> = Vec::new();

    if let Err(e) = write_slots(&layout, &slots, &mut report, &mut created_dirs)
        .and_then(|()| index::save_resolver(&layout, &resolver).map_err(CatalogError::from))
    {
        rollback(&created_dirs);
        return Err(e);
    }

    log::info!(
        "Materialized {} entries: {} folders created, {} already present, {} transform stubs",
        report.entries,
        report.created.len(),
        report.skipped.len(),
        report.transforms.len()
    );
    Ok(report)
}

fn write_slots(
    layout: &CatalogLayout,
    slots: &[Slot<'_>],
    report: &mut MaterializeReport,
    created_dirs: &mut Vec<PathBuf>,
) -> Result<(), CatalogError> {
    for slot in slots {
        if layout.catalog_slug_dir(&slot.slug).exists() {
            log::debug!("{}: already materialized, skipping", slot.slug);
            report.skipped.push(slot.slug.clone());
            continue;
        }
        if write_slot(layout, slot, created_dirs)? {
            report.transforms.push(slot.slug.clone());
        }
        report.created.push(slot.slug.clone());
    }
    Ok(())
}

/// One resolved slug and the glossary rows that map to it.
#[derive(Debug)]
struct Slot<'a> {
    slug: String,
    representative: &'a GlossaryEntry,
    datasets: Vec<&'a str>,
}

impl Slot<'_> {
    fn is_archive(&self) -> bool {
        self.datasets.iter().any(|d| *d != STANDALONE_DATASET)
    }

    fn needs_transform(&self) -> bool {
        self.is_archive() || !self.representative.is_ready()
    }

    /// File name the depositor writes into `catalog/<slug>/`.
    fn data_filename(&self) -> String {
        if self.is_archive() {
            return "data.zip".to_string();
        }
        match self.representative.preferred_format.as_deref() {
            Some(format) if !format.is_empty() => format!("data.{format}"),
            _ => "data".to_string(),
        }
    }
}

fn plan_slots<'a>(glossary: &'a [GlossaryEntry], resolver: &mut NameResolver) -> Vec<Slot<'a>> {
    let mut slots: Vec<Slot<'a>> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for entry in glossary {
        let resolution = resolver.resolve(entry.uri(), entry.name());
        match position.get(&resolution.slug) {
            Some(&i) => slots[i].datasets.push(entry.dataset.as_str()),
            None => {
                if !resolution.is_new {
                    log::debug!("{}: keeping slug '{}' from an earlier run", entry.uri(), resolution.slug);
                }
                position.insert(resolution.slug.clone(), slots.len());
                slots.push(Slot {
                    slug: resolution.slug,
                    representative: entry,
                    datasets: vec![entry.dataset.as_str()],
                });
            }
        }
    }
    slots
}

/// Create and populate one folder pair. Returns whether a transform stub
/// was written.
fn write_slot(
    layout: &CatalogLayout,
    slot: &Slot<'_>,
    created_dirs: &mut Vec<PathBuf>,
) -> Result<bool, CatalogError> {
    let task_dir = layout.task_slug_dir(&slot.slug);
    let catalog_dir = layout.catalog_slug_dir(&slot.slug);
    for dir in [&task_dir, &catalog_dir] {
        std::fs::create_dir(dir).map_err(|e| CatalogError::io(dir, e))?;
        created_dirs.push(dir.clone());
    }

    let entry = slot.representative;
    let data_path = catalog_dir.join(slot.data_filename());
    let data_path_str = data_path.to_string_lossy().into_owned();

    let depositor = task_dir.join(DEPOSITOR_SCRIPT);
    write_file(&depositor, &depositor_script(entry.uri(), &data_path_str))?;
    write_json(&outputs_sidecar(&depositor), &vec![data_path_str.clone()])?;

    write_json(&layout.datapackage_path(&slot.slug), &make_package(entry))?;

    if !slot.needs_transform() {
        log::debug!("{}: ready as-is, no transform", slot.slug);
        return Ok(false);
    }

    let transform = task_dir.join(TRANSFORM_SCRIPT);
    let body = if slot.is_archive() {
        archive_transform_stub(&data_path_str, &slot.datasets)
    } else {
        generic_transform_stub(&data_path_str, entry.preferred_format.as_deref())
    };
    write_file(&transform, &body)?;
    log::debug!("{}: wrote transform stub", slot.slug);
    Ok(true)
}

fn rollback(created_dirs: &[PathBuf]) {
    for dir in created_dirs.iter().rev() {
        if let Err(e) = std::fs::remove_dir_all(dir) {
            log::warn!("could not remove partial folder {}: {}", dir.display(), e);
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), CatalogError> {
    std::fs::write(path, contents).map_err(|e| CatalogError::io(path, e))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| CatalogError::Json {
        path: path.display().to_string(),
        source,
    })?;
    text.push('\n');
    write_file(path, &text)
}

/// Quote a string as a Python literal. JSON string syntax is a subset of
/// Python's.
fn py_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn depositor_script(uri: &str, data_path: &str) -> String {
    format!(
        "import requests\n\
         r = requests.get({uri})\n\
         with open({path}, \"wb\") as f:\n    f.write(r.content)\n\
         \n\
         outputs = [{path}]\n",
        uri = py_str(uri),
        path = py_str(data_path),
    )
}

fn archive_transform_stub(archive_path: &str, datasets: &[&str]) -> String {
    let mut members = String::new();
    for d in datasets {
        members.push_str(&format!("#   {d}\n"));
    }
    format!(
        "{INCOMPLETE_MARKER}: Finish implementing!\n\
         from zipfile import ZipFile\n\
         z = ZipFile({path}, \"r\")\n\
         # Datasets listed in the glossary for this archive:\n\
         {members}\
         \n\
         outputs = []\n",
        path = py_str(archive_path),
    )
}

fn generic_transform_stub(data_path: &str, format: Option<&str>) -> String {
    format!(
        "{INCOMPLETE_MARKER}: Finish implementing!\n\
         # Input: {data_path} (format: {format})\n\
         \n\
         outputs = []\n",
        format = format.unwrap_or("unknown"),
    )
}
