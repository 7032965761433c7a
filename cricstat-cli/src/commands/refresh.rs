use std::path::PathBuf;

use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cricstat_api::CricbuzzClient;
use cricstat_import::{IngestProgress, LogProgress, RefreshOptions};

use crate::CliError;
use crate::spinner;

/// CLI progress reporter for ingestion: a spinner for phases and records,
/// with skips and batch summaries printed above it.
pub(crate) struct CliIngestProgress {
    pb: ProgressBar,
}

impl CliIngestProgress {
    pub(crate) fn new(quiet: bool) -> Self {
        Self {
            pb: spinner::spinner("Starting", quiet),
        }
    }
}

impl IngestProgress for CliIngestProgress {
    fn on_phase(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    fn on_record(&self, current: usize, total: usize, label: &str) {
        if current.is_multiple_of(10) || current == total {
            self.pb
                .set_message(format!("[{}/{}] {}", current, total, label));
        }
    }

    fn on_skip(&self, label: &str, reason: &str) {
        self.pb.suspend(|| {
            log::warn!(
                "Skipped {}: {}",
                label,
                reason.if_supports_color(Stdout, |t| t.yellow()),
            );
        });
    }

    fn on_complete(&self, message: &str) {
        self.pb.suspend(|| log::info!("{}", message));
    }
}

pub(crate) fn run_refresh(
    db: Option<PathBuf>,
    options: RefreshOptions,
    quiet: bool,
    verbose: bool,
) -> Result<(), CliError> {
    let (config, _) = super::load_config(db)?;
    let client = CricbuzzClient::new(&config)?;
    let path = config
        .database_path_or_default()
        .ok_or_else(|| CliError::config("could not determine a data directory; pass --db"))?;
    let conn = super::open_at(&path)?;

    // Verbose runs log every step instead of animating a spinner.
    let spinner_progress = (!verbose).then(|| CliIngestProgress::new(quiet));
    let progress: &dyn IngestProgress = match &spinner_progress {
        Some(p) => p,
        None => &LogProgress,
    };
    let rt = super::runtime()?;
    let result = rt.block_on(cricstat_import::refresh_from_api(
        &client, &conn, &options, progress,
    ));
    if let Some(p) = &spinner_progress {
        p.pb.finish_and_clear();
    }
    let summary = result?;

    log::info!(
        "{}",
        "Refresh complete".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Matches:   {}", summary.matches);
    if summary.duplicates > 0 {
        log::info!("             {} listed in more than one feed", summary.duplicates);
    }
    for (reason, count) in &summary.matches.skip_reasons {
        log::info!("             {} skipped: {}", count, reason);
    }
    if !options.rankings.is_empty() {
        log::info!("  Rankings:  {}", summary.rankings);
    }
    if options.teams {
        log::info!("  Teams:     {}", summary.teams);
    }
    if options.series {
        log::info!("  Series:    {}", summary.series);
    }
    log::info!(
        "  Created with matches: {} team(s), {} venue(s), {} series",
        summary.matches.teams_created,
        summary.matches.venues_created,
        summary.matches.series_created,
    );
    log::info!("  Team records recomputed: {}", summary.teams_refreshed);
    log::info!("  Database: {}", path.display());
    Ok(())
}
