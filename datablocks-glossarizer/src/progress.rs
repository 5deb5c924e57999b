//! Glossarization progress reporting.

use crate::glossarize::Outcome;

/// Receives progress updates from [`run_glossarize`](crate::run_glossarize).
pub trait GlossarizeProgress {
    /// Called before the first resource with the number of pending resources.
    fn on_start(&self, total: usize);

    /// Called after each resource is sized.
    fn on_resource(&self, current: usize, total: usize, name: &str, outcome: Outcome);

    /// Called once the run is over, whether or not it finished.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl GlossarizeProgress for SilentProgress {
    fn on_start(&self, _total: usize) {}
    fn on_resource(&self, _current: usize, _total: usize, _name: &str, _outcome: Outcome) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl GlossarizeProgress for LogProgress {
    fn on_start(&self, total: usize) {
        log::info!("Glossarizing {} resources", total);
    }

    fn on_resource(&self, current: usize, total: usize, name: &str, outcome: Outcome) {
        if current.is_multiple_of(25) || current == total {
            log::info!("  [{}/{}] {}", current, total, name);
        }
        log::debug!("{}: {}", name, outcome);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
