//! Walk `tasks/` and build the workflow graph.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use datablocks_catalog::layout::{CatalogLayout, TASKS_DIR};
use datablocks_core::settings::DEFAULT_WORKFLOW_NAME;

use crate::error::{TaskDefinitionError, WorkflowError};
use crate::outputs::{declared_outputs, is_incomplete};
use crate::serialize::{AirscooterSerializer, WorkflowSerializer};
use crate::task::{TaskKind, TaskNode, absolutize, find_script};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagOptions {
    /// Used as the Airflow DAG id and in the DAG file name.
    pub workflow_name: String,
    pub start_date: NaiveDate,
}

impl Default for DagOptions {
    fn default() -> Self {
        Self {
            workflow_name: DEFAULT_WORKFLOW_NAME.to_string(),
            start_date: chrono::Local::now().date_naive(),
        }
    }
}

impl DagOptions {
    pub fn named(workflow_name: impl Into<String>) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            ..Default::default()
        }
    }
}

/// Outcome of [`update_dag`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DagReport {
    pub tasks: Vec<TaskNode>,
    /// Task folders (or single transforms) left out of the graph.
    pub errors: Vec<TaskDefinitionError>,
    /// Transforms left out because they are still stubs.
    pub skipped: Vec<String>,
    pub artifacts: Vec<PathBuf>,
}

/// Rebuild the workflow for the catalog under `root` and write it with the
/// Airscooter serializer.
pub fn update_dag(root: &Path, options: &DagOptions) -> Result<DagReport, WorkflowError> {
    update_dag_with(root, options, &AirscooterSerializer)
}

pub fn update_dag_with(
    root: &Path,
    options: &DagOptions,
    serializer: &dyn WorkflowSerializer,
) -> Result<DagReport, WorkflowError> {
    validate_name(&options.workflow_name)?;
    let tasks_dir = root.join(TASKS_DIR);
    if !tasks_dir.is_dir() {
        return Err(WorkflowError::MissingTasks(tasks_dir.display().to_string()));
    }
    let layout = CatalogLayout::open(root)?;

    let mut report = collect_tasks(&layout)?;
    for err in &report.errors {
        log::warn!("{}", err);
    }

    report.artifacts = serializer.write(&report.tasks, &layout, options)?;
    log::info!(
        "Workflow '{}': {} tasks, {} stub transforms skipped, {} task errors",
        options.workflow_name,
        report.tasks.len(),
        report.skipped.len(),
        report.errors.len()
    );
    Ok(report)
}

/// Read every task folder into nodes without writing anything.
pub fn collect_tasks(layout: &CatalogLayout) -> Result<DagReport, WorkflowError> {
    let mut report = DagReport::default();

    for slug in CatalogLayout::list_slugs(&layout.tasks_dir())? {
        let task_dir = layout.task_slug_dir(&slug);
        let base = layout.catalog_slug_dir(&slug);

        let depositor = match find_script(&task_dir, &slug, TaskKind::Depositor) {
            Ok(Some(script)) => script,
            Ok(None) => {
                report.errors.push(TaskDefinitionError::MissingDepositor { slug });
                continue;
            }
            Err(e) => {
                report.errors.push(e);
                continue;
            }
        };
        let outputs = match resolved_outputs(&slug, &depositor, &base) {
            Ok(outputs) => outputs,
            Err(e) => {
                report.errors.push(e);
                continue;
            }
        };
        let depositor = TaskNode::depositor(&slug, depositor, outputs);

        let transform = match find_script(&task_dir, &slug, TaskKind::Transform) {
            Ok(found) => found,
            Err(e) => {
                report.errors.push(e);
                None
            }
        };
        let transform = match transform {
            Some(script) => match transform_node(&slug, script, &base, &depositor) {
                Ok(Some(node)) => Some(node),
                Ok(None) => {
                    log::debug!("{}: transform is still a stub, leaving it out", slug);
                    report.skipped.push(format!("{slug}-{}", TaskKind::Transform.role()));
                    None
                }
                Err(e) => {
                    report.errors.push(e);
                    None
                }
            },
            None => None,
        };

        report.tasks.push(depositor);
        report.tasks.extend(transform);
    }
    Ok(report)
}

/// `Ok(None)` when the transform is an unfinished stub.
fn transform_node(
    slug: &str,
    script: PathBuf,
    base: &Path,
    depositor: &TaskNode,
) -> Result<Option<TaskNode>, TaskDefinitionError> {
    let stub = is_incomplete(&script).map_err(|e| outputs_error(slug, &script, e))?;
    if stub {
        return Ok(None);
    }
    let outputs = resolved_outputs(slug, &script, base)?;
    Ok(Some(TaskNode::transform(slug, script, outputs, depositor)))
}

fn resolved_outputs(slug: &str, script: &Path, base: &Path) -> Result<Vec<PathBuf>, TaskDefinitionError> {
    let declared = declared_outputs(script).map_err(|e| outputs_error(slug, script, e))?;
    Ok(declared.iter().map(|d| absolutize(d, base)).collect())
}

fn outputs_error(slug: &str, script: &Path, err: impl std::fmt::Display) -> TaskDefinitionError {
    TaskDefinitionError::Outputs {
        slug: slug.to_string(),
        script: script.display().to_string(),
        reason: err.to_string(),
    }
}

fn validate_name(name: &str) -> Result<(), WorkflowError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !name.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(WorkflowError::InvalidName(name.to_string()))
    }
}
