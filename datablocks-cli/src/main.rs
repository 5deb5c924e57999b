mod cli_types;
mod commands;
mod error;
mod logging;

use clap::Parser;

use datablocks_core::settings::Settings;

use cli_types::{Cli, Commands};
use error::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands must work even when the settings file is broken.
    if let Commands::Config { action } = cli.command {
        return commands::config::run_config(action);
    }

    let settings = Settings::load()?;
    let root = settings.resolve_root(cli.root);
    log::debug!("Catalog root: {}", root.display());

    match cli.command {
        Commands::Glossarize {
            resources,
            glossary,
            timeout,
            no_cache,
        } => commands::glossarize::run_glossarize(
            &root,
            &settings,
            resources,
            glossary,
            timeout,
            no_cache,
            cli.quiet,
            cli.logfile.is_some(),
        ),
        Commands::MergeResources { incoming, into } => {
            commands::resources::run_merge_resources(&incoming, &into)
        }
        Commands::Init { glossary } => commands::catalog::run_init(&root, glossary),
        Commands::Finalize => commands::catalog::run_finalize(&root),
        Commands::Dag { workflow } => commands::dag::run_dag(&root, &settings, workflow),
        Commands::Config { .. } => Ok(()),
    }
}
