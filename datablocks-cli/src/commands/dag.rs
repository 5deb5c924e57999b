use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datablocks_core::settings::Settings;
use datablocks_workflow::{DagOptions, update_dag};

use crate::error::CliError;

pub(crate) fn run_dag(
    root: &Path,
    settings: &Settings,
    workflow: Option<String>,
) -> Result<(), CliError> {
    let name = workflow.unwrap_or_else(|| settings.workflow.name.clone());
    let report = update_dag(root, &DagOptions::named(name))?;

    for slug in &report.skipped {
        log::info!(
            "  {} {} (transform not written yet)",
            "skipped".if_supports_color(Stdout, |t| t.yellow()),
            slug
        );
    }
    for err in &report.errors {
        log::error!("{}", err);
    }

    log::info!(
        "{} Wrote {} tasks",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.tasks.len().if_supports_color(Stdout, |t| t.bold())
    );
    for path in &report.artifacts {
        log::info!("  {}", path.display());
    }

    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::TaskDefinitions(report.errors.len()))
    }
}
