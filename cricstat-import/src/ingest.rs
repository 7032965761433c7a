//! Write normalized Cricbuzz records into the statistics database.
//!
//! Each match resolves (or creates) its teams, venue and series before the
//! match row itself. Matches, players and catalog series are keyed by their
//! external id and teams by name, so ingesting the same payload twice leaves
//! the database unchanged.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use cricstat_api::{
    ApiError, MatchesResponse, RankingCategory, RankingEntry, RankingsResponse,
    SeriesListEntry, SeriesListResponse, StatsFormat, TeamListEntry, TeamsResponse,
};
use cricstat_catalog::types::*;
use cricstat_db::operations::{self, BatchCounts, OperationError};
use cricstat_db::queries;
use rusqlite::Connection;
use thiserror::Error;

use crate::mapping::{self, ExternalMatch, ExternalTeam, ExternalVenue, Side, SkipReason};
use crate::progress::IngestProgress;

/// Value recorded in `ingest_log.source`.
pub const SOURCE: &str = "cricbuzz";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Statistics from a single ingestion batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub skipped: u32,
    pub skip_reasons: BTreeMap<SkipReason, u32>,
    pub teams_created: u32,
    pub venues_created: u32,
    pub series_created: u32,
}

impl IngestStats {
    fn skip(&mut self, reason: SkipReason) {
        self.skipped += 1;
        *self.skip_reasons.entry(reason).or_default() += 1;
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Counts in the shape stored in `ingest_log`.
    pub fn counts(&self) -> BatchCounts {
        BatchCounts {
            created: self.created,
            updated: self.updated,
            unchanged: self.unchanged,
            skipped: self.skipped,
        }
    }

    /// Add another batch's numbers to this one.
    pub fn merge(&mut self, other: &IngestStats) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        for (reason, n) in &other.skip_reasons {
            *self.skip_reasons.entry(*reason).or_default() += n;
        }
        self.teams_created += other.teams_created;
        self.venues_created += other.venues_created;
        self.series_created += other.series_created;
    }

    pub fn total(&self) -> u32 {
        self.created + self.updated + self.unchanged + self.skipped
    }
}

impl fmt::Display for IngestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} skipped",
            self.created, self.updated, self.unchanged, self.skipped
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created,
    Updated,
    Unchanged,
}

/// Matches gathered from one or more listings, de-duplicated by external id.
#[derive(Debug, Default, Clone)]
pub struct MatchBatch {
    pub matches: Vec<ExternalMatch>,
    pub skipped: Vec<(String, SkipReason)>,
    pub duplicates: u32,
}

/// Normalize and de-duplicate the matches in the given listings.
///
/// When the same match appears more than once, the last listing wins but
/// keeps the position of the first.
pub fn collect_matches<'a>(responses: impl IntoIterator<Item = &'a MatchesResponse>) -> MatchBatch {
    let mut batch = MatchBatch::default();
    let mut index: HashMap<String, usize> = HashMap::new();

    for response in responses {
        for listed in response.matches() {
            match mapping::normalize_match(&listed) {
                Ok(m) => match index.get(&m.external_id) {
                    Some(&i) => {
                        batch.duplicates += 1;
                        batch.matches[i] = m;
                    }
                    None => {
                        index.insert(m.external_id.clone(), batch.matches.len());
                        batch.matches.push(m);
                    }
                },
                Err(reason) => {
                    let label = listed
                        .info
                        .match_id
                        .clone()
                        .unwrap_or_else(|| "match without id".to_string());
                    batch.skipped.push((label, reason));
                }
            }
        }
    }
    batch
}

/// Whether a write failure is a data problem with this record rather than
/// a database failure.
fn is_rejection(err: &OperationError) -> bool {
    matches!(
        err,
        OperationError::Validation { .. } | OperationError::Conflict { .. }
    )
}

// ── Matches ─────────────────────────────────────────────────────────────────

/// Ingest a batch of matches in one transaction and log it to `ingest_log`.
pub fn ingest_matches(
    conn: &Connection,
    feed: &str,
    batch: &MatchBatch,
    progress: &dyn IngestProgress,
) -> Result<IngestStats, IngestError> {
    let mut stats = IngestStats::default();
    let tx = conn.unchecked_transaction()?;

    for (label, reason) in &batch.skipped {
        progress.on_skip(label, reason.as_str());
        stats.skip(*reason);
    }

    let total = batch.matches.len();
    for (i, m) in batch.matches.iter().enumerate() {
        match upsert_match(&tx, m, &mut stats) {
            Ok(outcome) => stats.record(outcome),
            Err(IngestError::Db(e)) if is_rejection(&e) => {
                progress.on_skip(&m.label(), &e.to_string());
                stats.skip(SkipReason::Rejected);
            }
            Err(e) => return Err(e),
        }
        progress.on_record(i + 1, total, &m.label());
    }

    operations::insert_ingest_log(&tx, SOURCE, feed, &stats.counts())?;
    tx.commit()?;

    progress.on_complete(&format!("Matches ({}): {}", feed, stats));
    Ok(stats)
}

fn resolve_team(conn: &Connection, team: &ExternalTeam, stats: &mut IngestStats) -> Result<i64, IngestError> {
    if let Some(id) = queries::find_team_by_name(conn, &team.name)? {
        return Ok(id);
    }
    // International sides are named after their country.
    let id = operations::insert_team(
        conn,
        &NewTeam {
            name: team.name.clone(),
            country: team.name.clone(),
        },
    )?;
    stats.teams_created += 1;
    log::debug!("Created team '{}' ({})", team.name, id);
    Ok(id)
}

fn resolve_venue(
    conn: &Connection,
    venue: Option<&ExternalVenue>,
    stats: &mut IngestStats,
) -> Result<Option<i64>, IngestError> {
    let Some(venue) = venue else {
        return Ok(None);
    };
    if let Some(id) = queries::find_venue(conn, &venue.name, &venue.city)? {
        return Ok(Some(id));
    }
    let id = operations::insert_venue(
        conn,
        &NewVenue {
            name: venue.name.clone(),
            city: venue.city.clone(),
            country: mapping::UNKNOWN_COUNTRY.to_string(),
            capacity: None,
        },
    )?;
    stats.venues_created += 1;
    log::debug!("Created venue '{}, {}' ({})", venue.name, venue.city, id);
    Ok(Some(id))
}

fn resolve_series(
    conn: &Connection,
    m: &ExternalMatch,
    stats: &mut IngestStats,
) -> Result<Option<i64>, IngestError> {
    let external_id = m.series_external_id.as_deref();
    let name = match (&m.series_name, external_id) {
        (Some(name), _) => name.clone(),
        (None, Some(ext)) => format!("Series {}", ext),
        (None, None) => return Ok(None),
    };
    if let Some(series) = queries::find_series(conn, external_id, &name)? {
        return Ok(Some(series.id));
    }
    let id = operations::insert_series(
        conn,
        &NewSeries {
            external_id: external_id.map(str::to_string),
            name,
            host_country: None,
            match_type: None,
            start_date: None,
            end_date: None,
            total_matches: None,
        },
    )?;
    stats.series_created += 1;
    Ok(Some(id))
}

fn upsert_match(conn: &Connection, m: &ExternalMatch, stats: &mut IngestStats) -> Result<Outcome, IngestError> {
    let team1_id = resolve_team(conn, &m.team1, stats)?;
    let team2_id = resolve_team(conn, &m.team2, stats)?;
    let venue_id = resolve_venue(conn, m.venue.as_ref(), stats)?;
    let series_id = resolve_series(conn, m, stats)?;
    let winner_id = m.winner.map(|side| match side {
        Side::Team1 => team1_id,
        Side::Team2 => team2_id,
    });

    match queries::find_match_by_external_id(conn, &m.external_id)? {
        Some(existing) => {
            let patch = MatchPatch {
                series_id: series_id.into(),
                team1_id: Patch::Set(team1_id),
                team2_id: Patch::Set(team2_id),
                venue_id: venue_id.into(),
                match_date: Patch::Set(m.match_date),
                format: Patch::Set(m.format),
                description: m.description.clone().into(),
                toss_winner_id: Patch::Keep,
                toss_decision: Patch::Keep,
                winner_id: winner_id.into(),
                victory: m.victory.into(),
                status: Patch::Set(m.status),
            };
            let changed = operations::update_match(conn, existing.id, &patch)?;
            if changed.is_empty() {
                Ok(Outcome::Unchanged)
            } else {
                log::debug!("Updated match {} ({})", existing.id, changed.join(", "));
                Ok(Outcome::Updated)
            }
        }
        None => {
            let new = NewMatch {
                external_id: Some(m.external_id.clone()),
                series_id,
                venue_id,
                description: m.description.clone(),
                winner_id,
                victory: m.victory,
                status: m.status,
                ..NewMatch::new(team1_id, team2_id, m.match_date, m.format)
            };
            operations::insert_match(conn, &new)?;
            Ok(Outcome::Created)
        }
    }
}

// ── Rankings ────────────────────────────────────────────────────────────────

/// The playing role implied by a ranking table.
pub fn role_for_category(category: RankingCategory) -> PlayingRole {
    match category {
        RankingCategory::Batsmen => PlayingRole::Batsman,
        RankingCategory::Bowlers => PlayingRole::Bowler,
        RankingCategory::AllRounders => PlayingRole::AllRounder,
    }
}

/// Role to store for an existing player seen in a ranking table.
///
/// An all-rounder or wicket-keeper stays one when they also appear in a
/// batting or bowling table.
fn role_patch(current: PlayingRole, ranked: PlayingRole) -> Patch<PlayingRole> {
    match (current, ranked) {
        (PlayingRole::AllRounder | PlayingRole::WicketKeeper, PlayingRole::Batsman | PlayingRole::Bowler) => {
            Patch::Keep
        }
        _ => Patch::Set(ranked),
    }
}

/// Upsert the players of a ranking table by external id and log the batch.
pub fn ingest_rankings(
    conn: &Connection,
    category: RankingCategory,
    format: StatsFormat,
    response: &RankingsResponse,
    progress: &dyn IngestProgress,
) -> Result<IngestStats, IngestError> {
    let mut stats = IngestStats::default();
    let role = role_for_category(category);
    let tx = conn.unchecked_transaction()?;

    let total = response.rank.len();
    for (i, entry) in response.rank.iter().enumerate() {
        let label = entry
            .name
            .clone()
            .or_else(|| entry.id.clone())
            .unwrap_or_else(|| format!("rank entry {}", i + 1));
        match upsert_ranked_player(&tx, entry, role) {
            Ok(Ok(outcome)) => stats.record(outcome),
            Ok(Err(reason)) => {
                progress.on_skip(&label, reason.as_str());
                stats.skip(reason);
            }
            Err(IngestError::Db(e)) if is_rejection(&e) => {
                progress.on_skip(&label, &e.to_string());
                stats.skip(SkipReason::Rejected);
            }
            Err(e) => return Err(e),
        }
        progress.on_record(i + 1, total, &label);
    }

    let feed = format!("rankings/{}/{}", category, format);
    operations::insert_ingest_log(&tx, SOURCE, &feed, &stats.counts())?;
    tx.commit()?;

    progress.on_complete(&format!("Rankings ({}): {}", feed, stats));
    Ok(stats)
}

fn upsert_ranked_player(
    conn: &Connection,
    entry: &RankingEntry,
    role: PlayingRole,
) -> Result<Result<Outcome, SkipReason>, IngestError> {
    let Some(external_id) = mapping::non_empty(entry.id.as_deref()) else {
        return Ok(Err(SkipReason::MissingId));
    };
    let Some(name) = mapping::non_empty(entry.name.as_deref()) else {
        return Ok(Err(SkipReason::MissingName));
    };
    let Some(country) = mapping::non_empty(entry.country.as_deref()) else {
        return Ok(Err(SkipReason::MissingCountry));
    };
    let team_id = queries::find_team_by_country(conn, &country)?;

    match queries::find_player_by_external_id(conn, &external_id)? {
        Some(existing) => {
            let patch = PlayerPatch {
                full_name: Patch::Set(name),
                country: Patch::Set(country),
                playing_role: role_patch(existing.playing_role, role),
                team_id: team_id.into(),
                ..PlayerPatch::default()
            };
            let changed = operations::update_player(conn, existing.id, &patch)?;
            Ok(Ok(if changed.is_empty() {
                Outcome::Unchanged
            } else {
                Outcome::Updated
            }))
        }
        None => {
            let mut player = NewPlayer::new(&name, &country, role);
            player.external_id = Some(external_id);
            player.team_id = team_id;
            operations::insert_player(conn, &player)?;
            Ok(Ok(Outcome::Created))
        }
    }
}

// ── Team and series catalogs ────────────────────────────────────────────────

/// Make sure every listed team exists, matching by name, and log the batch.
pub fn ingest_teams(
    conn: &Connection,
    response: &TeamsResponse,
    progress: &dyn IngestProgress,
) -> Result<IngestStats, IngestError> {
    let mut stats = IngestStats::default();
    let tx = conn.unchecked_transaction()?;

    let teams: Vec<&TeamListEntry> = response.teams().collect();
    let total = teams.len();
    for (i, entry) in teams.into_iter().enumerate() {
        let label = mapping::non_empty(entry.team_name.as_deref())
            .or_else(|| entry.team_id.clone())
            .unwrap_or_else(|| format!("team {}", i + 1));
        match upsert_listed_team(&tx, entry) {
            Ok(Ok(outcome)) => stats.record(outcome),
            Ok(Err(reason)) => {
                progress.on_skip(&label, reason.as_str());
                stats.skip(reason);
            }
            Err(IngestError::Db(e)) if is_rejection(&e) => {
                progress.on_skip(&label, &e.to_string());
                stats.skip(SkipReason::Rejected);
            }
            Err(e) => return Err(e),
        }
        progress.on_record(i + 1, total, &label);
    }

    operations::insert_ingest_log(&tx, SOURCE, "teams", &stats.counts())?;
    tx.commit()?;

    progress.on_complete(&format!("Teams: {}", stats));
    Ok(stats)
}

fn upsert_listed_team(
    conn: &Connection,
    entry: &TeamListEntry,
) -> Result<Result<Outcome, SkipReason>, IngestError> {
    let Some(name) = mapping::non_empty(entry.team_name.as_deref()) else {
        return Ok(Err(SkipReason::MissingName));
    };
    if queries::find_team_by_name(conn, &name)?.is_some() {
        return Ok(Ok(Outcome::Unchanged));
    }
    let id = operations::insert_team(
        conn,
        &NewTeam {
            name: name.clone(),
            country: name.clone(),
        },
    )?;
    log::debug!("Created team '{}' ({})", name, id);
    Ok(Ok(Outcome::Created))
}

/// Upsert the series calendar by external id and log the batch.
pub fn ingest_series(
    conn: &Connection,
    response: &SeriesListResponse,
    progress: &dyn IngestProgress,
) -> Result<IngestStats, IngestError> {
    let mut stats = IngestStats::default();
    let tx = conn.unchecked_transaction()?;

    let listed: Vec<&SeriesListEntry> = response.series().collect();
    let total = listed.len();
    for (i, entry) in listed.into_iter().enumerate() {
        let label = mapping::non_empty(entry.name.as_deref())
            .or_else(|| entry.id.clone())
            .unwrap_or_else(|| format!("series {}", i + 1));
        match upsert_listed_series(&tx, entry) {
            Ok(Ok(outcome)) => stats.record(outcome),
            Ok(Err(reason)) => {
                progress.on_skip(&label, reason.as_str());
                stats.skip(reason);
            }
            Err(IngestError::Db(e)) if is_rejection(&e) => {
                progress.on_skip(&label, &e.to_string());
                stats.skip(SkipReason::Rejected);
            }
            Err(e) => return Err(e),
        }
        progress.on_record(i + 1, total, &label);
    }

    operations::insert_ingest_log(&tx, SOURCE, "series", &stats.counts())?;
    tx.commit()?;

    progress.on_complete(&format!("Series: {}", stats));
    Ok(stats)
}

fn upsert_listed_series(
    conn: &Connection,
    entry: &SeriesListEntry,
) -> Result<Result<Outcome, SkipReason>, IngestError> {
    let Some(external_id) = mapping::non_empty(entry.id.as_deref()) else {
        return Ok(Err(SkipReason::MissingId));
    };
    let Some(name) = mapping::non_empty(entry.name.as_deref()) else {
        return Ok(Err(SkipReason::MissingName));
    };
    let start = entry.start_dt.as_deref().and_then(mapping::normalize_timestamp);
    let end = entry.end_dt.as_deref().and_then(mapping::normalize_timestamp);

    match queries::find_series(conn, Some(&external_id), &name)? {
        Some(existing) => {
            let patch = SeriesPatch {
                name: Patch::Set(name),
                start_date: start.into(),
                end_date: end.into(),
                ..SeriesPatch::default()
            };
            let changed = operations::update_series(conn, existing.id, &patch)?;
            if changed.is_empty() {
                Ok(Ok(Outcome::Unchanged))
            } else {
                log::debug!("Updated series {} ({})", existing.id, changed.join(", "));
                Ok(Ok(Outcome::Updated))
            }
        }
        None => {
            let id = operations::insert_series(
                conn,
                &NewSeries {
                    external_id: Some(external_id),
                    name: name.clone(),
                    host_country: None,
                    match_type: None,
                    start_date: start,
                    end_date: end,
                    total_matches: None,
                },
            )?;
            log::debug!("Created series '{}' ({})", name, id);
            Ok(Ok(Outcome::Created))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_rounders_keep_their_role() {
        assert_eq!(role_patch(PlayingRole::AllRounder, PlayingRole::Batsman), Patch::Keep);
        assert_eq!(role_patch(PlayingRole::WicketKeeper, PlayingRole::Batsman), Patch::Keep);
        assert_eq!(
            role_patch(PlayingRole::Batsman, PlayingRole::AllRounder),
            Patch::Set(PlayingRole::AllRounder)
        );
        assert_eq!(
            role_patch(PlayingRole::Batsman, PlayingRole::Bowler),
            Patch::Set(PlayingRole::Bowler)
        );
    }

    #[test]
    fn stats_merge_and_display() {
        let mut a = IngestStats::default();
        a.record(Outcome::Created);
        a.skip(SkipReason::MissingId);
        let mut b = IngestStats::default();
        b.record(Outcome::Unchanged);
        b.skip(SkipReason::MissingId);
        b.skip(SkipReason::SameTeams);
        a.merge(&b);
        assert_eq!(a.total(), 5);
        assert_eq!(a.skip_reasons[&SkipReason::MissingId], 2);
        assert_eq!(a.to_string(), "1 created, 0 updated, 1 unchanged, 3 skipped");
    }
}
