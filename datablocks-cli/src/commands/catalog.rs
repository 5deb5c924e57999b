use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datablocks_catalog::{finalize, init_catalog};

use crate::commands::{GLOSSARY_FILE, path_or_default};
use crate::error::CliError;

pub(crate) fn run_init(root: &Path, glossary: Option<PathBuf>) -> Result<(), CliError> {
    let glossary_path = path_or_default(glossary, root, GLOSSARY_FILE);
    let report = init_catalog(&glossary_path, root)?;

    log::info!(
        "{} Materialized {} glossary entries under {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.entries.if_supports_color(Stdout, |t| t.bold()),
        root.display()
    );
    log::info!("  {} new catalog entries", report.created.len());
    if !report.skipped.is_empty() {
        log::info!("  {} already present, left alone", report.skipped.len());
    }
    if report.r#unsized > 0 {
        log::warn!(
            "{} entries timed out during sizing; re-run glossarize to size them",
            report.r#unsized
        );
    }
    if !report.transforms.is_empty() {
        log::info!(
            "  {} entries need a transform before they are complete:",
            report.transforms.len().if_supports_color(Stdout, |t| t.bold())
        );
        for slug in &report.transforms {
            log::info!("    tasks/{}/transform.py", slug);
        }
    }
    Ok(())
}

pub(crate) fn run_finalize(root: &Path) -> Result<(), CliError> {
    let report = finalize(root)?;

    for slug in &report.removed {
        log::info!(
            "  {} {}",
            "removed".if_supports_color(Stdout, |t| t.red()),
            slug
        );
    }
    for (slug, reason) in &report.unreadable {
        log::warn!("{}: left in place ({})", slug, reason);
    }

    log::info!(
        "{} Kept {} entries, removed {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.kept.len().if_supports_color(Stdout, |t| t.bold()),
        report.removed.len().if_supports_color(Stdout, |t| t.bold()),
    );
    if !report.removed.is_empty() {
        log::info!("Run `datablocks dag` to drop the removed tasks from the workflow.");
    }
    Ok(())
}
