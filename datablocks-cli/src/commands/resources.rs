use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datablocks_catalog::store;

use crate::error::CliError;

/// Append the resources in `incoming` to `into`, keeping existing records
/// for URIs already present.
pub(crate) fn run_merge_resources(incoming: &Path, into: &Path) -> Result<(), CliError> {
    let new_resources = store::load_resources(incoming)?;
    let appended = store::write_resources(&new_resources, into)?;

    log::info!(
        "{} Added {} of {} resources to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        appended.if_supports_color(Stdout, |t| t.bold()),
        new_resources.len(),
        into.display()
    );
    let dropped = new_resources.len() - appended;
    if dropped > 0 {
        log::info!("  {} already listed", dropped);
    }
    Ok(())
}
