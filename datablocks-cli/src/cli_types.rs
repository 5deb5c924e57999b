//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "datablocks")]
#[command(about = "Build a local catalog of open-data portal resources", long_about = None)]
pub(crate) struct Cli {
    /// Catalog root (defaults to the configured root, then the current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Size pending resources and add them to the glossary
    Glossarize {
        /// Resource list (default: <root>/resources.json)
        #[arg(long)]
        resources: Option<PathBuf>,

        /// Glossary file (default: <root>/glossary.json)
        #[arg(long)]
        glossary: Option<PathBuf>,

        /// Seconds to allow each download (default from settings, else 60)
        #[arg(long)]
        timeout: Option<u64>,

        /// Re-size resources already flagged as processed
        #[arg(long)]
        no_cache: bool,
    },

    /// Merge newly discovered resources into a resource list (first write wins)
    MergeResources {
        /// JSON array of resources to add
        incoming: PathBuf,

        /// Resource list to merge into (created if missing)
        into: PathBuf,
    },

    /// Materialize the glossary into catalog/ and tasks/ folders
    Init {
        /// Glossary file (default: <root>/glossary.json)
        #[arg(long)]
        glossary: Option<PathBuf>,
    },

    /// Delete catalog entries whose data package is not complete
    Finalize,

    /// Rebuild the workflow DAG from the task folders
    Dag {
        /// Workflow name (default from settings, else "datablocks")
        #[arg(long)]
        workflow: Option<String>,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings
    Show,

    /// Print the settings file path
    Path,

    /// Set the default catalog root
    SetRoot {
        /// Directory to use as the catalog root
        path: PathBuf,
    },
}
