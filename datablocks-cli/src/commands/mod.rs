pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod dag;
pub(crate) mod glossarize;
pub(crate) mod resources;

use std::path::{Path, PathBuf};

/// Default location of the glossary inside a catalog root.
pub(crate) const GLOSSARY_FILE: &str = "glossary.json";

/// Default location of the resource list inside a catalog root.
pub(crate) const RESOURCES_FILE: &str = "resources.json";

/// Use the explicit path if one was given, else `<root>/<default>`.
pub(crate) fn path_or_default(explicit: Option<PathBuf>, root: &Path, default: &str) -> PathBuf {
    explicit.unwrap_or_else(|| root.join(default))
}
