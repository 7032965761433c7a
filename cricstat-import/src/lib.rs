//! Ingest Cricbuzz API data into the statistics database.
//!
//! This crate owns the adapter logic: normalizing external payloads into
//! catalog values, resolving teams, venues and series, upserting matches,
//! ranked players and the series calendar by external id, and the
//! in-process refresh.

pub mod ingest;
pub mod mapping;
pub mod progress;
pub mod refresh;

pub use ingest::{
    IngestError, IngestStats, MatchBatch, SOURCE, collect_matches, ingest_matches,
    ingest_rankings, ingest_series, ingest_teams, role_for_category,
};
pub use mapping::{
    ExternalMatch, ParsedResult, SkipReason, map_format, map_status, normalize_match,
    normalize_timestamp, parse_result,
};
pub use progress::{IngestProgress, LogProgress, SilentProgress};
pub use refresh::{RefreshOptions, RefreshSummary, refresh_from_api};
