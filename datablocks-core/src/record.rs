//! Resource and glossary record types.
//!
//! Both record kinds are stored as flat JSON objects. Portal-specific keys
//! that this crate does not model are kept in `extra` so a load/save cycle
//! never drops information a glossarizer wrote.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// `dataset` value meaning "the resource itself is the dataset".
pub const STANDALONE_DATASET: &str = ".";

/// Formats that are usable as-is, with no transform step.
pub const READY_FORMATS: &[&str] = &["csv", "geojson"];

// ── Flags ───────────────────────────────────────────────────────────────────

/// Processing state tokens attached to a resource record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    /// Sized and glossarized in a prior run.
    Processed,
    /// Excluded from glossarization by hand.
    Ignore,
    /// The portal no longer serves this resource.
    Removed,
    /// Sizing failed; retried on the next run.
    Error,
}

impl Flag {
    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Processed => "processed",
            Flag::Ignore => "ignore",
            Flag::Removed => "removed",
            Flag::Error => "error",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Resource ────────────────────────────────────────────────────────────────

/// One discoverable, fetchable unit of open data as listed by a portal.
///
/// `resource` (the download URI) is the only field guaranteed unique across
/// a resource list; `name` may collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub resource: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_views: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub column_names: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics_provided: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords_provided: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flags: Vec<Flag>,
    /// Portal-specific keys (e.g. `resource_type`) carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Resource {
    /// Minimal record with only the two required fields set.
    pub fn new(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            name: name.into(),
            landing_page: None,
            protocol: None,
            description: String::new(),
            sources: Vec::new(),
            created: None,
            last_updated: None,
            page_views: None,
            column_names: Vec::new(),
            topics_provided: Vec::new(),
            keywords_provided: Vec::new(),
            flags: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Parse one record out of a raw JSON value, reporting which record failed.
    pub fn from_value(index: usize, value: Value) -> Result<Self, SchemaError> {
        require_fields(index, &value, &["resource", "name"])?;
        let record: Resource =
            serde_json::from_value(value).map_err(|e| SchemaError::invalid(index, e.to_string()))?;
        if record.resource.trim().is_empty() {
            return Err(SchemaError::invalid(index, "`resource` is empty"));
        }
        Ok(record)
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Add a flag. Flags are set-like, so adding one twice is a no-op.
    pub fn add_flag(&mut self, flag: Flag) {
        if !self.has_flag(flag) {
            self.flags.push(flag);
        }
    }

    pub fn remove_flag(&mut self, flag: Flag) {
        self.flags.retain(|f| *f != flag);
    }

    /// Where to point a human at this resource in warnings: the landing page
    /// when the portal gave one, the download URI otherwise.
    pub fn display_location(&self) -> &str {
        self.landing_page.as_deref().unwrap_or(&self.resource)
    }
}

/// Portals write `null` for fields they have no value for; read it as the
/// field's empty value, same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Filesize ────────────────────────────────────────────────────────────────

/// Size information attached during sizing.
///
/// Portals report a number (or a numeric string taken from a
/// `Content-Length` header). A sizing download that hit its wall-clock limit
/// records the sentinel text `>{N}s` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filesize {
    Number(serde_json::Number),
    Text(String),
}

impl Filesize {
    /// Sentinel for a download that did not finish within `seconds`.
    pub fn timed_out(seconds: u64) -> Self {
        Filesize::Text(format!(">{seconds}s"))
    }

    /// Size in KiB, as the generic sizer reports it.
    pub fn kib(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Filesize::Number)
            .unwrap_or_else(|| Filesize::Text(value.to_string()))
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Filesize::Text(s) => s
                .strip_prefix('>')
                .and_then(|rest| rest.strip_suffix('s'))
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit())),
            Filesize::Number(_) => false,
        }
    }
}

impl fmt::Display for Filesize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filesize::Number(n) => write!(f, "{n}"),
            Filesize::Text(s) => f.write_str(s),
        }
    }
}

// ── Glossary entry ──────────────────────────────────────────────────────────

/// A resource record enriched with sizing and format information.
///
/// Several entries may share one `resource` URI when an archive unpacks into
/// more than one dataset; `dataset` then names the member inside the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    #[serde(flatten)]
    pub record: Resource,
    pub dataset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<Filesize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_formats: Option<Vec<String>>,
}

impl GlossaryEntry {
    /// Start an entry from a resource record. The `processed` flag belongs to
    /// the resource list, not the glossary, so it is stripped here.
    pub fn from_resource(resource: &Resource, dataset: impl Into<String>) -> Self {
        let mut record = resource.clone();
        record.remove_flag(Flag::Processed);
        Self {
            record,
            dataset: dataset.into(),
            filesize: None,
            preferred_format: None,
            preferred_mimetype: None,
            rows: None,
            columns: None,
            available_formats: None,
        }
    }

    /// Parse one entry out of a raw JSON value, reporting which entry failed.
    pub fn from_value(index: usize, value: Value) -> Result<Self, SchemaError> {
        require_fields(index, &value, &["resource", "name", "dataset"])?;
        let entry: GlossaryEntry =
            serde_json::from_value(value).map_err(|e| SchemaError::invalid(index, e.to_string()))?;
        entry.validate(index)?;
        Ok(entry)
    }

    /// Checks serde cannot express: non-empty URI and dataset.
    pub fn validate(&self, index: usize) -> Result<(), SchemaError> {
        if self.record.resource.trim().is_empty() {
            return Err(SchemaError::invalid(index, "`resource` is empty"));
        }
        if self.dataset.is_empty() {
            return Err(SchemaError::invalid(index, "`dataset` is empty"));
        }
        Ok(())
    }

    pub fn uri(&self) -> &str {
        &self.record.resource
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// True when the resource is the dataset (not a member of an archive).
    pub fn is_standalone(&self) -> bool {
        self.dataset == STANDALONE_DATASET
    }

    /// True when the entry needs no transform: a standalone file in a
    /// directly usable format.
    pub fn is_ready(&self) -> bool {
        self.is_standalone()
            && self
                .preferred_format
                .as_deref()
                .is_some_and(|f| READY_FORMATS.contains(&f))
    }
}

fn require_fields(index: usize, value: &Value, fields: &[&str]) -> Result<(), SchemaError> {
    let Some(object) = value.as_object() else {
        return Err(SchemaError::invalid(index, "entry is not a JSON object"));
    };
    for field in fields {
        if !object.contains_key(*field) {
            return Err(SchemaError::MissingField {
                index,
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
