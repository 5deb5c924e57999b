//! Folder slugs for catalog entries.
//!
//! Names are not unique across a glossary, only resource URIs are, so folder
//! identity is keyed by URI:
//!
//! - a URI seen before keeps the slug it was first given, even if its name
//!   has since changed;
//! - a new URI whose slugified name is already taken gets the first free
//!   `-2`, `-3`, ... suffix;
//! - otherwise the bare slugified name is used.

use std::collections::{BTreeMap, HashSet};

use unicode_normalization::UnicodeNormalization;

/// Slug used when a name has no word characters at all.
pub const FALLBACK_SLUG: &str = "unnamed";

/// Filesystem-safe form of a human-readable name.
///
/// NFKC-normalizes, drops everything but word characters, whitespace and
/// hyphens, trims and lowercases, then collapses whitespace/hyphen runs into
/// single hyphens.
///
/// ```
/// use datablocks_catalog::slugify;
///
/// assert_eq!(slugify("Demographic Statistics By Zip Code"), "demographic-statistics-by-zip-code");
/// assert_eq!(slugify("  NYC  Parks -- Trees (2015)! "), "nyc-parks-trees-2015");
/// ```
pub fn slugify(value: &str) -> String {
    let normalized: String = value.nfkc().collect();
    let kept: String = normalized
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let lowered = kept.trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_run = false;
    for c in lowered.chars() {
        if c == '-' || c.is_whitespace() {
            if !in_run {
                slug.push('-');
                in_run = true;
            }
        } else {
            slug.push(c);
            in_run = false;
        }
    }
    slug
}

/// Outcome of resolving one glossary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub slug: String,
    /// False when the URI already had a slug.
    pub is_new: bool,
}

/// Collision-safe URI -> slug assignment.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    by_uri: BTreeMap<String, String>,
    taken: HashSet<String>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with assignments from an earlier run.
    pub fn with_assignments(assignments: BTreeMap<String, String>) -> Self {
        let taken = assignments.values().cloned().collect();
        Self {
            by_uri: assignments,
            taken,
        }
    }

    pub fn resolve(&mut self, uri: &str, name: &str) -> Resolution {
        if let Some(slug) = self.by_uri.get(uri) {
            return Resolution {
                slug: slug.clone(),
                is_new: false,
            };
        }

        let mut base = slugify(name);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }

        let slug = if self.taken.contains(&base) {
            let mut n = 2u32;
            loop {
                let candidate = format!("{base}-{n}");
                if !self.taken.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        } else {
            base
        };

        log::debug!("assigned slug '{}' to {}", slug, uri);
        self.taken.insert(slug.clone());
        self.by_uri.insert(uri.to_string(), slug.clone());
        Resolution { slug, is_new: true }
    }

    pub fn assignments(&self) -> &BTreeMap<String, String> {
        &self.by_uri
    }

    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/slug_tests.rs"]
mod tests;
