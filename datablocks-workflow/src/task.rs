//! Task nodes and the task folder conventions they are read from.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TaskDefinitionError;
use crate::outputs::ScriptKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Depositor,
    Transform,
}

impl TaskKind {
    /// Substring a script's file name must contain to play this role.
    pub fn role(self) -> &'static str {
        match self {
            TaskKind::Depositor => "depositor",
            TaskKind::Transform => "transform",
        }
    }
}

/// One runnable step of the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    /// `<slug>-depositor` or `<slug>-transform`.
    pub name: String,
    pub kind: TaskKind,
    pub script: PathBuf,
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
    /// Names of the nodes that must run first.
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl TaskNode {
    pub fn depositor(slug: &str, script: PathBuf, outputs: Vec<PathBuf>) -> Self {
        Self {
            name: format!("{slug}-{}", TaskKind::Depositor.role()),
            kind: TaskKind::Depositor,
            script,
            inputs: Vec::new(),
            outputs,
            requirements: Vec::new(),
        }
    }

    /// A transform reading everything `upstream` writes.
    pub fn transform(slug: &str, script: PathBuf, outputs: Vec<PathBuf>, upstream: &TaskNode) -> Self {
        Self {
            name: format!("{slug}-{}", TaskKind::Transform.role()),
            kind: TaskKind::Transform,
            script,
            inputs: upstream.outputs.clone(),
            outputs,
            requirements: vec![upstream.name.clone()],
        }
    }

    /// Python identifier for this node in the generated DAG file.
    pub fn var_name(&self) -> String {
        format!("var_{}", self.name.replace('-', "_"))
    }

    pub fn script_kind(&self) -> Option<ScriptKind> {
        ScriptKind::from_path(&self.script)
    }
}

/// Find the single script in `dir` playing `kind`'s role.
///
/// Sidecars and other non-script files are ignored. More than one candidate
/// is an error rather than a guess.
pub fn find_script(dir: &Path, slug: &str, kind: TaskKind) -> Result<Option<PathBuf>, TaskDefinitionError> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .filter(|p| ScriptKind::from_path(p).is_some())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.contains(kind.role()))
                })
                .collect()
        })
        .unwrap_or_default();
    candidates.sort();

    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        _ => Err(TaskDefinitionError::Ambiguous {
            slug: slug.to_string(),
            role: kind.role().to_string(),
            scripts: candidates.iter().map(|p| p.display().to_string()).collect(),
        }),
    }
}

/// Resolve a declared output against the slug's catalog folder.
///
/// Absolute paths pass through. Relative ones are joined onto `base` and
/// cleaned of `.` and `..` without touching the filesystem, since the file
/// normally does not exist until the task has run.
pub fn absolutize(declared: &str, base: &Path) -> PathBuf {
    let path = Path::new(declared);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let mut out = PathBuf::new();
    for component in base.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
