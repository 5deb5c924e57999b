//! Persistent URI -> slug assignments (`root/.catalog-index.json`).
//!
//! Keeps a resource's folder stable across runs even when a later glossary
//! renames it. Slugs stay reserved after their folders are finalized away.

use std::collections::BTreeMap;

use crate::error::{CatalogError, StoreError};
use crate::layout::CatalogLayout;
use crate::slug::NameResolver;
use crate::store::write_json_atomic;

/// Seed a resolver from the index file, or start empty if there is none.
pub fn load_resolver(layout: &CatalogLayout) -> Result<NameResolver, CatalogError> {
    let path = layout.index_path();
    if !path.is_file() {
        return Ok(NameResolver::new());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| CatalogError::io(&path, e))?;
    let assignments: BTreeMap<String, String> =
        serde_json::from_str(&contents).map_err(|source| CatalogError::Json {
            path: path.display().to_string(),
            source,
        })?;
    Ok(NameResolver::with_assignments(assignments))
}

pub fn save_resolver(layout: &CatalogLayout, resolver: &NameResolver) -> Result<(), StoreError> {
    write_json_atomic(&layout.index_path(), resolver.assignments())
}
