//! File-backed resource list and glossary.
//!
//! Both files are pretty-printed JSON arrays of flat objects. Writes go to a
//! sibling `.tmp` file and are renamed into place.
//!
//! Enrichment drivers must call the writers even when their loop fails
//! partway, so work done before the failure is not lost.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use datablocks_core::{Flag, GlossaryEntry, Resource, SchemaError};
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// Pending resources plus the glossary accumulated so far.
pub type Todo = (Vec<Resource>, Vec<GlossaryEntry>);

/// Counts from [`sync_resource_flags`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub updated: usize,
    pub appended: usize,
}

/// Load the work list for an enrichment run.
///
/// The resource file is required. Resources flagged `ignore` are dropped;
/// with `use_cache`, resources already flagged `processed` are dropped too.
/// `removed` resources stay in: a portal outage is cheap to re-check. A
/// missing glossary file starts an empty glossary.
pub fn load_todo(resource_path: &Path, glossary_path: &Path, use_cache: bool) -> Result<Todo, StoreError> {
    if !resource_path.is_file() {
        return Err(StoreError::missing_input(resource_path.display().to_string()));
    }
    let resources = load_resources(resource_path)?;
    let total = resources.len();

    let pending: Vec<Resource> = resources
        .into_iter()
        .filter(|r| !r.has_flag(Flag::Ignore))
        .filter(|r| !(use_cache && r.has_flag(Flag::Processed)))
        .collect();

    let glossary = if glossary_path.is_file() {
        load_glossary(glossary_path)?
    } else {
        Vec::new()
    };

    log::debug!(
        "{} of {} resources pending, {} glossary entries on disk",
        pending.len(),
        total,
        glossary.len()
    );
    Ok((pending, glossary))
}

/// Read a resource file.
pub fn load_resources(path: &Path) -> Result<Vec<Resource>, StoreError> {
    read_records(path, Resource::from_value)
}

/// Read a glossary file. Fails if the file is absent.
pub fn load_glossary(path: &Path) -> Result<Vec<GlossaryEntry>, StoreError> {
    if !path.is_file() {
        return Err(StoreError::missing_input(path.display().to_string()));
    }
    read_records(path, GlossaryEntry::from_value)
}

/// Merge newly discovered resources into the file at `path`, keyed by URI.
///
/// A record whose `resource` is already on disk (or earlier in the same
/// batch) is dropped: first write wins. Returns the number appended.
pub fn write_resources(new_resources: &[Resource], path: &Path) -> Result<usize, StoreError> {
    let mut existing = if path.is_file() {
        load_resources(path)?
    } else {
        Vec::new()
    };
    let mut seen: HashSet<String> = existing.iter().map(|r| r.resource.clone()).collect();

    let before = existing.len();
    for r in new_resources {
        if seen.insert(r.resource.clone()) {
            existing.push(r.clone());
        }
    }
    let appended = existing.len() - before;

    write_json_atomic(path, &existing)?;
    log::debug!(
        "{}: appended {} of {} resources",
        path.display(),
        appended,
        new_resources.len()
    );
    Ok(appended)
}

/// Record the flags of `resources` in the file at `path`.
///
/// Known URIs take the incoming flags; unknown URIs are appended. Records
/// not mentioned in `resources` are left untouched, so a filtered work list
/// can be written back without losing the rest of the file.
pub fn sync_resource_flags(resources: &[Resource], path: &Path) -> Result<SyncStats, StoreError> {
    let mut existing = if path.is_file() {
        load_resources(path)?
    } else {
        Vec::new()
    };
    let positions: HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, r)| (r.resource.clone(), i))
        .collect();

    let mut stats = SyncStats::default();
    let mut appended_uris = HashSet::new();
    for r in resources {
        match positions.get(&r.resource) {
            Some(&i) => {
                if existing[i].flags != r.flags {
                    existing[i].flags = r.flags.clone();
                    stats.updated += 1;
                }
            }
            None => {
                if appended_uris.insert(r.resource.clone()) {
                    existing.push(r.clone());
                    stats.appended += 1;
                }
            }
        }
    }

    write_json_atomic(path, &existing)?;
    Ok(stats)
}

/// Overwrite the glossary file with the full in-memory glossary.
pub fn write_glossary(glossary: &[GlossaryEntry], path: &Path) -> Result<(), StoreError> {
    write_json_atomic(path, glossary)
}

/// Serialize `value` as pretty JSON to `path` via a temp file and rename.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;
    text.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, text).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

fn read_records<T>(
    path: &Path,
    parse: impl Fn(usize, Value) -> Result<T, SchemaError>,
) -> Result<Vec<T>, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let raw: Vec<Value> = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;
    raw.into_iter()
        .enumerate()
        .map(|(i, v)| parse(i, v))
        .collect::<Result<Vec<T>, SchemaError>>()
        .map_err(|source| StoreError::Schema {
            path: path.display().to_string(),
            source,
        })
}
