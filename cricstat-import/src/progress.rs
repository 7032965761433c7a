//! Ingestion progress reporting.

/// Trait for receiving ingestion progress updates.
pub trait IngestProgress {
    /// Called when a phase starts (e.g., "Fetching recent matches").
    fn on_phase(&self, message: &str);

    /// Called after each external record is processed.
    fn on_record(&self, current: usize, total: usize, label: &str);

    /// Called when a record is skipped for a data-quality reason.
    fn on_skip(&self, label: &str, reason: &str);

    /// Called when the ingestion is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl IngestProgress for SilentProgress {
    fn on_phase(&self, _message: &str) {}
    fn on_record(&self, _current: usize, _total: usize, _label: &str) {}
    fn on_skip(&self, _label: &str, _reason: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl IngestProgress for LogProgress {
    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_record(&self, current: usize, total: usize, label: &str) {
        if current.is_multiple_of(50) || current == total {
            log::info!("  [{}/{}] {}", current, total, label);
        }
    }

    fn on_skip(&self, label: &str, reason: &str) {
        log::warn!("Skipping {}: {}", label, reason);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
