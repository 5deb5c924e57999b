//! Persisting a task list for the orchestrator.
//!
//! [`AirscooterSerializer`] writes two artifacts under `root/.airflow/`:
//! `airscooter.yml`, a declarative description of every node, and
//! `dags/<workflow>_dag.py`, an Airflow DAG with one `BashOperator` per node.
//! Both are rewritten from scratch on every build, so nodes whose task
//! folders are gone drop out.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use datablocks_catalog::layout::CatalogLayout;
use serde::{Deserialize, Serialize};

use crate::builder::DagOptions;
use crate::error::WorkflowError;
use crate::outputs::ScriptKind;
use crate::task::TaskNode;

pub const DESCRIPTION_FILE: &str = "airscooter.yml";
pub const DAGS_DIR: &str = "dags";

/// Turns a task list into on-disk workflow artifacts.
pub trait WorkflowSerializer {
    /// Write the artifacts and return their paths.
    fn write(
        &self,
        tasks: &[TaskNode],
        layout: &CatalogLayout,
        options: &DagOptions,
    ) -> Result<Vec<PathBuf>, WorkflowError>;
}

/// Contents of `airscooter.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDescription {
    pub name: String,
    /// ISO date, `YYYY-MM-DD`.
    pub start_date: String,
    pub tasks: Vec<TaskNode>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AirscooterSerializer;

impl AirscooterSerializer {
    pub fn description_path(layout: &CatalogLayout) -> PathBuf {
        layout.airflow_dir().join(DESCRIPTION_FILE)
    }

    pub fn dag_path(layout: &CatalogLayout, workflow_name: &str) -> PathBuf {
        layout
            .airflow_dir()
            .join(DAGS_DIR)
            .join(format!("{workflow_name}_dag.py"))
    }
}

impl WorkflowSerializer for AirscooterSerializer {
    fn write(
        &self,
        tasks: &[TaskNode],
        layout: &CatalogLayout,
        options: &DagOptions,
    ) -> Result<Vec<PathBuf>, WorkflowError> {
        let description = WorkflowDescription {
            name: options.workflow_name.clone(),
            start_date: options.start_date.format("%Y-%m-%d").to_string(),
            tasks: tasks.to_vec(),
        };
        let yaml_path = Self::description_path(layout);
        let yaml = serde_yml::to_string(&description).map_err(|source| WorkflowError::Yaml {
            path: yaml_path.display().to_string(),
            source,
        })?;
        write_atomic(&yaml_path, &yaml)?;

        let dag_path = Self::dag_path(layout, &options.workflow_name);
        write_atomic(
            &dag_path,
            &airflow_dag_source(tasks, &options.workflow_name, options.start_date),
        )?;

        log::debug!(
            "wrote {} and {}",
            yaml_path.display(),
            dag_path.display()
        );
        Ok(vec![yaml_path, dag_path])
    }
}

/// Read back an `airscooter.yml`.
pub fn load_description(path: &Path) -> Result<WorkflowDescription, WorkflowError> {
    let contents = std::fs::read_to_string(path).map_err(|e| WorkflowError::io(path, e))?;
    serde_yml::from_str(&contents).map_err(|source| WorkflowError::Yaml {
        path: path.display().to_string(),
        source,
    })
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), WorkflowError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| WorkflowError::io(parent, e))?;
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, contents).map_err(|e| WorkflowError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| WorkflowError::io(path, e))
}

/// Quote a string as a Python literal.
fn py_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Shell command that runs one task script.
///
/// The trailing space keeps Airflow from treating a command ending in `.sh`
/// as a template file name.
pub fn bash_command(node: &TaskNode) -> String {
    let script = node.script.display().to_string();
    let quoted = format!("\"{}\"", script.replace('\\', "\\\\").replace('"', "\\\""));
    match node.script_kind() {
        Some(ScriptKind::Shell) => format!("bash {quoted} "),
        Some(ScriptKind::Notebook) => {
            format!("jupyter nbconvert --to notebook --execute --inplace {quoted} ")
        }
        Some(ScriptKind::Python) | None => format!("python {quoted} "),
    }
}

pub fn airflow_dag_source(tasks: &[TaskNode], workflow_name: &str, start_date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Generated by datablocks. Rebuild with `datablocks dag`; edits are overwritten.");
    let _ = writeln!(out, "from datetime import datetime");
    let _ = writeln!(out);
    let _ = writeln!(out, "from airflow import DAG");
    let _ = writeln!(out, "from airflow.operators.bash_operator import BashOperator");
    let _ = writeln!(out);
    let _ = writeln!(out, "dag = DAG(");
    let _ = writeln!(out, "    {},", py_str(workflow_name));
    let _ = writeln!(
        out,
        "    default_args={{\"owner\": \"datablocks\", \"start_date\": datetime({}, {}, {})}},",
        start_date.year(),
        start_date.month(),
        start_date.day()
    );
    let _ = writeln!(out, "    schedule_interval=None,");
    let _ = writeln!(out, ")");

    if !tasks.is_empty() {
        let _ = writeln!(out);
    }
    let vars = variable_names(tasks);
    for (node, var) in tasks.iter().zip(&vars) {
        let _ = writeln!(
            out,
            "{} = BashOperator(task_id={}, bash_command={}, dag=dag)",
            var,
            py_str(&node.name),
            py_str(&bash_command(node))
        );
    }

    let mut edges: Vec<(usize, usize)> = Vec::new();
    for (i, node) in tasks.iter().enumerate() {
        for requirement in &node.requirements {
            match tasks.iter().position(|t| t.name == *requirement) {
                Some(j) => edges.push((i, j)),
                None => log::warn!("{}: requirement {} is not in the workflow", node.name, requirement),
            }
        }
    }
    if !edges.is_empty() {
        let _ = writeln!(out);
    }
    for (i, j) in edges {
        let _ = writeln!(out, "{}.set_upstream({})", vars[i], vars[j]);
    }
    out
}

/// One Python variable per node, in task order.
///
/// Task names are unique but their identifier forms need not be (`a-b` and
/// `a_b` both become `a_b`), so a clashing name takes a numeric suffix.
fn variable_names(tasks: &[TaskNode]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    tasks
        .iter()
        .map(|node| {
            let base = node.var_name();
            let mut var = base.clone();
            let mut n = 2;
            while !used.insert(var.clone()) {
                var = format!("{base}_{n}");
                n += 1;
            }
            var
        })
        .collect()
}
