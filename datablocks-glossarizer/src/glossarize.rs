//! Turning resources into glossary entries by fetching them.
//!
//! This is the slow, generic path: it works on any downloadable resource but
//! costs one request (and often one download) per resource. Portals whose
//! APIs already report sizes and formats should be glossarized from that
//! metadata instead.

use std::fmt;
use std::path::Path;

use datablocks_catalog::store;
use datablocks_core::{Filesize, Flag, GlossaryEntry, Resource, STANDALONE_DATASET};

use crate::error::{GlossarizeError, SizingError};
use crate::progress::GlossarizeProgress;
use crate::sizing::Sizer;

/// What happened to one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sized; entries produced and the resource flagged `processed`.
    Sized,
    /// Did not download in time; one placeholder entry, retried next run.
    TimedOut,
    /// Sizing failed; flagged `error`, no entries, retried next run.
    Failed,
    /// The URI serves an HTML page, not data. Left unflagged, so the next
    /// run looks again in case the portal starts serving the file.
    LandingPage,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Sized => "sized",
            Outcome::TimedOut => "timed out",
            Outcome::Failed => "failed",
            Outcome::LandingPage => "landing page",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct Glossarized {
    pub outcome: Outcome,
    pub entries: Vec<GlossaryEntry>,
}

/// Size one resource and build its glossary entries.
///
/// Updates `resource`'s flags in place. Only [`SizingError::Fatal`] is
/// returned as an error; every other failure becomes an [`Outcome`].
pub fn glossarize_resource(resource: &mut Resource, sizer: &dyn Sizer) -> Result<Glossarized, SizingError> {
    let sizings = match sizer.size(&resource.resource) {
        Ok(s) => s,
        Err(SizingError::TimedOut { seconds, .. }) => {
            let mut entry = GlossaryEntry::from_resource(resource, STANDALONE_DATASET);
            entry.filesize = Some(Filesize::timed_out(seconds));
            return Ok(Glossarized {
                outcome: Outcome::TimedOut,
                entries: vec![entry],
            });
        }
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            log::warn!(
                "{} failed to process and is flagged as an error: {}",
                resource.display_location(),
                e
            );
            resource.add_flag(Flag::Error);
            return Ok(failed());
        }
    };

    let Some(first) = sizings.first() else {
        log::warn!(
            "{} contains no files and is flagged as an error",
            resource.display_location()
        );
        resource.add_flag(Flag::Error);
        return Ok(failed());
    };
    if first.is_html() {
        log::debug!("{}: landing page, no entries", resource.resource);
        return Ok(Glossarized {
            outcome: Outcome::LandingPage,
            entries: Vec::new(),
        });
    }

    let entries = sizings
        .into_iter()
        .filter(|s| !s.is_html())
        .map(|s| {
            let mut entry = GlossaryEntry::from_resource(resource, s.dataset);
            entry.filesize = Some(Filesize::kib(s.filesize_kib));
            entry.preferred_format = (!s.extension.is_empty()).then_some(s.extension);
            entry.preferred_mimetype = Some(s.mimetype);
            entry
        })
        .collect();

    resource.remove_flag(Flag::Error);
    resource.add_flag(Flag::Processed);
    Ok(Glossarized {
        outcome: Outcome::Sized,
        entries,
    })
}

fn failed() -> Glossarized {
    Glossarized {
        outcome: Outcome::Failed,
        entries: Vec::new(),
    }
}

/// Per-outcome counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossarizeReport {
    pub pending: usize,
    pub sized: usize,
    pub timed_out: usize,
    pub failed: usize,
    pub landing_pages: usize,
    /// Glossary entries on disk after the run.
    pub entries: usize,
}

impl GlossarizeReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Sized => self.sized += 1,
            Outcome::TimedOut => self.timed_out += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::LandingPage => self.landing_pages += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} resources: {} sized, {} timed out, {} failed, {} landing pages; {} glossary entries",
            self.pending, self.sized, self.timed_out, self.failed, self.landing_pages, self.entries
        )
    }
}

/// Resources sized between two saves of the resource and glossary files.
pub const FLUSH_EVERY: usize = 25;

/// Glossarize every pending resource in `resource_path` into `glossary_path`.
///
/// Both files are saved every [`FLUSH_EVERY`] resources and once more when
/// the run ends, however it ends: a fatal sizing error, a store error or a
/// panic inside the sizer. A restarted run picks up from the last save.
pub fn run_glossarize(
    resource_path: &Path,
    glossary_path: &Path,
    sizer: &dyn Sizer,
    use_cache: bool,
    progress: &dyn GlossarizeProgress,
) -> Result<GlossarizeReport, GlossarizeError> {
    let (pending, glossary) = store::load_todo(resource_path, glossary_path, use_cache)?;
    let mut report = GlossarizeReport {
        pending: pending.len(),
        ..Default::default()
    };

    progress.on_start(pending.len());
    let mut checkpoint = Checkpoint {
        pending,
        glossary,
        resource_path,
        glossary_path,
        dirty: false,
    };
    let outcome = glossarize_all(&mut checkpoint, sizer, progress, &mut report);

    report.entries = checkpoint.glossary.len();
    let saved = checkpoint.save();
    progress.on_complete(&report.summary());

    match (outcome, saved) {
        (Err(e), saved) => {
            if let Err(save_err) = saved {
                log::error!("could not save progress after error: {}", save_err);
            }
            Err(e)
        }
        (Ok(()), Err(e)) => Err(e.into()),
        (Ok(()), Ok(())) => Ok(report),
    }
}

/// In-memory state of a run, written back to disk on [`Checkpoint::save`]
/// and, if unsaved changes remain, when dropped (including during a panic).
struct Checkpoint<'a> {
    pending: Vec<Resource>,
    glossary: Vec<GlossaryEntry>,
    resource_path: &'a Path,
    glossary_path: &'a Path,
    dirty: bool,
}

impl Checkpoint<'_> {
    fn save(&mut self) -> Result<(), datablocks_catalog::StoreError> {
        flush(&self.pending, &self.glossary, self.resource_path, self.glossary_path)?;
        self.dirty = false;
        Ok(())
    }
}

impl Drop for Checkpoint<'_> {
    fn drop(&mut self) {
        if !self.dirty {
            return;
        }
        log::warn!("glossarize run interrupted, saving progress");
        if let Err(e) = self.save() {
            log::error!("could not save progress: {}", e);
        }
    }
}

fn glossarize_all(
    checkpoint: &mut Checkpoint<'_>,
    sizer: &dyn Sizer,
    progress: &dyn GlossarizeProgress,
    report: &mut GlossarizeReport,
) -> Result<(), GlossarizeError> {
    let total = checkpoint.pending.len();
    for i in 0..total {
        let resource = &mut checkpoint.pending[i];
        let result = glossarize_resource(resource, sizer).map_err(GlossarizeError::Sizing)?;
        if !result.entries.is_empty() {
            checkpoint.glossary.retain(|e| e.uri() != resource.resource);
            checkpoint.glossary.extend(result.entries);
        }
        checkpoint.dirty = true;
        report.record(result.outcome);
        progress.on_resource(i + 1, total, &resource.name, result.outcome);

        if (i + 1).is_multiple_of(FLUSH_EVERY) && i + 1 < total {
            log::debug!("saving progress after {} resources", i + 1);
            checkpoint.save()?;
        }
    }
    Ok(())
}

fn flush(
    resources: &[Resource],
    glossary: &[GlossaryEntry],
    resource_path: &Path,
    glossary_path: &Path,
) -> Result<(), datablocks_catalog::StoreError> {
    store::sync_resource_flags(resources, resource_path)?;
    store::write_glossary(glossary, glossary_path)
}
