use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datablocks_core::settings::Settings;
use datablocks_glossarizer::{GlossarizeProgress, HttpSizer, LogProgress, Outcome};

use crate::commands::{GLOSSARY_FILE, RESOURCES_FILE, path_or_default};
use crate::error::CliError;

/// Progress bar over the pending resources.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(quiet: bool) -> Self {
        let bar = ProgressBar::no_length();
        if quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl GlossarizeProgress for BarProgress {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        log::info!(
            "Glossarizing {} pending resources",
            total.if_supports_color(Stdout, |t| t.bold())
        );
    }

    fn on_resource(&self, current: usize, _total: usize, name: &str, outcome: Outcome) {
        self.bar.set_position(current as u64);
        self.bar.set_message(name.to_string());
        match outcome {
            Outcome::Sized => log::debug!("{}: {}", name, outcome),
            Outcome::LandingPage => self.bar.suspend(|| log::info!("  {} ({})", name, outcome)),
            Outcome::TimedOut | Outcome::Failed => {
                self.bar.suspend(|| log::warn!("{}: {}", name, outcome))
            }
        }
    }

    fn on_complete(&self, message: &str) {
        self.bar.finish_and_clear();
        log::info!(
            "{} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            message
        );
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn run_glossarize(
    root: &Path,
    settings: &Settings,
    resources: Option<PathBuf>,
    glossary: Option<PathBuf>,
    timeout: Option<u64>,
    no_cache: bool,
    quiet: bool,
    to_logfile: bool,
) -> Result<(), CliError> {
    let resource_path = path_or_default(resources, root, RESOURCES_FILE);
    let glossary_path = path_or_default(glossary, root, GLOSSARY_FILE);
    let timeout_secs = timeout.unwrap_or(settings.glossarize.timeout_secs);
    let use_cache = settings.glossarize.use_cache && !no_cache;

    log::debug!(
        "Resources: {}, glossary: {}, timeout: {}s, cache: {}",
        resource_path.display(),
        glossary_path.display(),
        timeout_secs,
        use_cache
    );

    let sizer = HttpSizer::new(timeout_secs)?;
    // A bar means nothing in a log file; log every so often instead.
    let progress: Box<dyn GlossarizeProgress> = if to_logfile {
        Box::new(LogProgress)
    } else {
        Box::new(BarProgress::new(quiet))
    };
    let report = datablocks_glossarizer::run_glossarize(
        &resource_path,
        &glossary_path,
        &sizer,
        use_cache,
        progress.as_ref(),
    )?;

    let retried = report.timed_out + report.failed + report.landing_pages;
    if retried > 0 {
        log::info!(
            "{} resources will be retried on the next run",
            retried.if_supports_color(Stdout, |t| t.bold())
        );
    }
    log::info!("Glossary: {}", glossary_path.display());
    Ok(())
}
