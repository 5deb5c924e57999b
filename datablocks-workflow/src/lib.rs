//! Workflow construction over a materialized catalog.
//!
//! Every `tasks/<slug>/` folder contributes a depositor node and, once its
//! transform is no longer a stub, a transform node that depends on it. Nodes
//! carry absolute input and output paths taken from the scripts' declared
//! outputs (see [`outputs`]).

pub mod builder;
pub mod error;
pub mod outputs;
pub mod serialize;
pub mod task;

pub use builder::{DagOptions, DagReport, collect_tasks, update_dag, update_dag_with};
pub use error::{OutputParseError, TaskDefinitionError, WorkflowError};
pub use serialize::{AirscooterSerializer, WorkflowDescription, WorkflowSerializer, load_description};
pub use task::{TaskKind, TaskNode};
