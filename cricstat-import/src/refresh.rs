//! In-process refresh: fetch feeds from the API and ingest them.

use cricstat_api::{CricbuzzClient, MatchFeed, RankingCategory, StatsFormat};
use cricstat_db::operations;
use futures::future::join_all;
use rusqlite::Connection;

use crate::ingest::{self, IngestError, IngestStats};
use crate::progress::IngestProgress;

/// What to fetch during a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOptions {
    pub feeds: Vec<MatchFeed>,
    pub rankings: Vec<(RankingCategory, StatsFormat)>,
    /// Fetch the international team list.
    pub teams: bool,
    /// Fetch the international series calendar.
    pub series: bool,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            feeds: MatchFeed::ALL.to_vec(),
            rankings: Vec::new(),
            teams: false,
            series: false,
        }
    }
}

impl RefreshOptions {
    /// Also fetch every ranking table in every format.
    pub fn with_all_rankings(mut self) -> Self {
        self.rankings = RankingCategory::ALL
            .iter()
            .flat_map(|c| StatsFormat::ALL.iter().map(move |f| (*c, *f)))
            .collect();
        self
    }
}

/// Outcome of a refresh.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub matches: IngestStats,
    /// Matches listed in more than one feed.
    pub duplicates: u32,
    pub rankings: IngestStats,
    pub teams: IngestStats,
    pub series: IngestStats,
    /// Teams whose win/loss counters were recomputed.
    pub teams_refreshed: usize,
}

/// Fetch the selected feeds concurrently, ingest them as one batch, then
/// recompute team records.
///
/// Any fetch failure aborts the refresh before anything is written.
pub async fn refresh_from_api(
    client: &CricbuzzClient,
    conn: &Connection,
    options: &RefreshOptions,
    progress: &dyn IngestProgress,
) -> Result<RefreshSummary, IngestError> {
    let mut summary = RefreshSummary::default();

    let feed_names: Vec<&str> = options.feeds.iter().map(|f| f.as_str()).collect();
    progress.on_phase(&format!("Fetching match feeds: {}", feed_names.join(", ")));
    let responses = join_all(options.feeds.iter().map(|feed| client.matches(*feed)))
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let rankings = if options.rankings.is_empty() {
        Vec::new()
    } else {
        progress.on_phase(&format!("Fetching {} ranking table(s)", options.rankings.len()));
        join_all(options.rankings.iter().map(|&(category, format)| async move {
            client
                .rankings(category, format)
                .await
                .map(|response| (category, format, response))
        }))
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?
    };

    let teams = if options.teams {
        progress.on_phase("Fetching international teams");
        Some(client.teams().await?)
    } else {
        None
    };
    let series = if options.series {
        progress.on_phase("Fetching international series");
        Some(client.series().await?)
    } else {
        None
    };

    // Catalog entries first so matches resolve to them.
    if let Some(response) = &teams {
        summary.teams = ingest::ingest_teams(conn, response, progress)?;
    }
    if let Some(response) = &series {
        summary.series = ingest::ingest_series(conn, response, progress)?;
    }

    if !responses.is_empty() {
        let batch = ingest::collect_matches(&responses);
        summary.duplicates = batch.duplicates;
        progress.on_phase(&format!("Ingesting {} match(es)", batch.matches.len()));
        summary.matches = ingest::ingest_matches(conn, &feed_names.join(","), &batch, progress)?;
    }

    for (category, format, response) in &rankings {
        let stats = ingest::ingest_rankings(conn, *category, *format, response, progress)?;
        summary.rankings.merge(&stats);
    }

    summary.teams_refreshed = operations::refresh_team_records(conn)?;
    progress.on_complete(&format!(
        "Refresh complete: matches {}; rankings {}; teams {}; series {}; {} team record(s) recomputed",
        summary.matches, summary.rankings, summary.teams, summary.series, summary.teams_refreshed
    ));
    Ok(summary)
}
