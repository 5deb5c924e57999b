use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datablocks_core::settings::{Settings, settings_path};

use crate::cli_types::ConfigAction;
use crate::error::CliError;

pub(crate) fn run_config(action: ConfigAction) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => run_config_show(),
        ConfigAction::Path => {
            log::info!("{}", settings_path().display());
            Ok(())
        }
        ConfigAction::SetRoot { path } => run_config_set_root(path),
    }
}

fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();
    let settings = Settings::load_from(&path)?;

    log::info!(
        "{}",
        "Settings".if_supports_color(Stdout, |t| t.bold())
    );
    if path.exists() {
        log::info!("  File: {}", path.display());
    } else {
        log::info!(
            "  File: {} {}",
            path.display(),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed())
        );
    }
    log::info!("");
    let root = match &settings.catalog.root {
        Some(root) => root.display().to_string(),
        None => "(current directory)".to_string(),
    };
    log::info!("  {:<24} {}", "catalog.root", root);
    log::info!("  {:<24} {}", "glossarize.timeout_secs", settings.glossarize.timeout_secs);
    log::info!("  {:<24} {}", "glossarize.use_cache", settings.glossarize.use_cache);
    log::info!("  {:<24} {}", "workflow.name", settings.workflow.name);
    Ok(())
}

fn run_config_set_root(path: PathBuf) -> Result<(), CliError> {
    let root = std::path::absolute(&path)?;
    if !root.is_dir() {
        return Err(CliError::other(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let settings_file = settings_path();
    let mut settings = Settings::load_from(&settings_file)?;
    settings.catalog.root = Some(root.clone());
    settings.save_to(&settings_file)?;

    log::info!(
        "{} Catalog root set to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        root.display()
    );
    Ok(())
}
