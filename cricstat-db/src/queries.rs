//! Read queries for the statistics database.
//!
//! Provides single-row lookups, limited listing with name search, external-id
//! resolution for ingestion, career aggregates and database counts.

use std::str::FromStr;

use cricstat_catalog::types::*;
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::operations::OperationError;

/// Paging and search options for `list_*` queries.
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Case-insensitive substring matched against the entity's name.
    pub search: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            search: None,
            limit: 50,
            offset: 0,
        }
    }
}

impl ListOptions {
    pub fn search(term: &str) -> Self {
        Self {
            search: Some(term.to_string()),
            ..Self::default()
        }
    }

    fn pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
    }
}

// ── Column helpers ──────────────────────────────────────────────────────────

fn enum_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_enum_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = ParseEnumError>,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(text) => text.parse().map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        }),
        None => Ok(None),
    }
}

/// Run a listing query with an optional `LIKE` filter bound as `?1`.
fn list_with<T>(
    conn: &Connection,
    base: &str,
    filter: &str,
    order: &str,
    opts: &ListOptions,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, OperationError> {
    let pattern = opts.pattern();
    let mut sql = base.to_string();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(p) = pattern {
        sql.push_str(&format!(" WHERE {filter}"));
        values.push(Box::new(p));
    }
    sql.push_str(&format!(
        " ORDER BY {order} LIMIT ?{} OFFSET ?{}",
        values.len() + 1,
        values.len() + 2
    ));
    values.push(Box::new(opts.limit));
    values.push(Box::new(opts.offset));

    let mut stmt = conn.prepare(&sql)?;
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let rows = stmt.query_map(refs.as_slice(), map)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Teams ───────────────────────────────────────────────────────────────────

const TEAM_COLUMNS: &str = "SELECT id, name, country, total_matches, total_wins, total_losses FROM teams";

fn row_to_team(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        total_matches: row.get(3)?,
        total_wins: row.get(4)?,
        total_losses: row.get(5)?,
    })
}

pub fn get_team(conn: &Connection, id: i64) -> Result<Option<Team>, OperationError> {
    let sql = format!("{TEAM_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_team)
        .optional()
        .map_err(Into::into)
}

/// Find a team id by name (case-insensitive exact match).
pub fn find_team_by_name(conn: &Connection, name: &str) -> Result<Option<i64>, OperationError> {
    let result = conn.query_row(
        "SELECT id FROM teams WHERE name = ?1",
        params![name.trim()],
        |row| row.get::<_, i64>(0),
    );
    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find the lowest-id team representing a country (case-insensitive).
pub fn find_team_by_country(
    conn: &Connection,
    country: &str,
) -> Result<Option<i64>, OperationError> {
    conn.query_row(
        "SELECT id FROM teams WHERE country = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
        params![country.trim()],
        |row| row.get::<_, i64>(0),
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_teams(conn: &Connection, opts: &ListOptions) -> Result<Vec<Team>, OperationError> {
    list_with(
        conn,
        TEAM_COLUMNS,
        "name LIKE ?1 ESCAPE '\\'",
        "name",
        opts,
        row_to_team,
    )
}

// ── Venues ──────────────────────────────────────────────────────────────────

const VENUE_COLUMNS: &str = "SELECT id, name, city, country, capacity FROM venues";

fn row_to_venue(row: &Row<'_>) -> rusqlite::Result<Venue> {
    Ok(Venue {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        country: row.get(3)?,
        capacity: row.get(4)?,
    })
}

pub fn get_venue(conn: &Connection, id: i64) -> Result<Option<Venue>, OperationError> {
    let sql = format!("{VENUE_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_venue)
        .optional()
        .map_err(Into::into)
}

/// Find a venue id by name and city (case-insensitive).
pub fn find_venue(conn: &Connection, name: &str, city: &str) -> Result<Option<i64>, OperationError> {
    conn.query_row(
        "SELECT id FROM venues WHERE name = ?1 AND city = ?2",
        params![name.trim(), city.trim()],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_venues(conn: &Connection, opts: &ListOptions) -> Result<Vec<Venue>, OperationError> {
    list_with(
        conn,
        VENUE_COLUMNS,
        "(name LIKE ?1 ESCAPE '\\' OR city LIKE ?1 ESCAPE '\\')",
        "name",
        opts,
        row_to_venue,
    )
}

// ── Players ─────────────────────────────────────────────────────────────────

const PLAYER_COLUMNS: &str = "SELECT p.id, p.external_id, p.full_name, p.country, p.playing_role,
        p.batting_style, p.bowling_style, p.team_id
    FROM players p LEFT JOIN teams t ON t.id = p.team_id";

fn row_to_player(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        external_id: row.get(1)?,
        full_name: row.get(2)?,
        country: row.get(3)?,
        playing_role: enum_col(row, 4)?,
        batting_style: row.get(5)?,
        bowling_style: row.get(6)?,
        team_id: row.get(7)?,
    })
}

pub fn get_player(conn: &Connection, id: i64) -> Result<Option<Player>, OperationError> {
    let sql = format!("{PLAYER_COLUMNS} WHERE p.id = ?1");
    conn.query_row(&sql, params![id], row_to_player)
        .optional()
        .map_err(Into::into)
}

pub fn find_player_by_external_id(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<Player>, OperationError> {
    let sql = format!("{PLAYER_COLUMNS} WHERE p.external_id = ?1");
    conn.query_row(&sql, params![external_id], row_to_player)
        .optional()
        .map_err(Into::into)
}

/// List players; the search term matches the player's name or their team's name.
pub fn list_players(conn: &Connection, opts: &ListOptions) -> Result<Vec<Player>, OperationError> {
    list_with(
        conn,
        PLAYER_COLUMNS,
        "(p.full_name LIKE ?1 ESCAPE '\\' OR t.name LIKE ?1 ESCAPE '\\')",
        "p.full_name",
        opts,
        row_to_player,
    )
}

// ── Series ──────────────────────────────────────────────────────────────────

const SERIES_COLUMNS: &str = "SELECT id, external_id, name, host_country, match_type,
        start_date, end_date, total_matches
    FROM series";

fn row_to_series(row: &Row<'_>) -> rusqlite::Result<Series> {
    Ok(Series {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        host_country: row.get(3)?,
        match_type: opt_enum_col(row, 4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        total_matches: row.get(7)?,
    })
}

pub fn get_series(conn: &Connection, id: i64) -> Result<Option<Series>, OperationError> {
    let sql = format!("{SERIES_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_series)
        .optional()
        .map_err(Into::into)
}

/// Find a series by external id, falling back to a case-insensitive name match.
pub fn find_series(
    conn: &Connection,
    external_id: Option<&str>,
    name: &str,
) -> Result<Option<Series>, OperationError> {
    if let Some(ext) = external_id {
        let sql = format!("{SERIES_COLUMNS} WHERE external_id = ?1");
        if let Some(found) = conn
            .query_row(&sql, params![ext], row_to_series)
            .optional()?
        {
            return Ok(Some(found));
        }
    }
    let sql = format!("{SERIES_COLUMNS} WHERE name = ?1");
    conn.query_row(&sql, params![name.trim()], row_to_series)
        .optional()
        .map_err(Into::into)
}

pub fn list_series(conn: &Connection, opts: &ListOptions) -> Result<Vec<Series>, OperationError> {
    list_with(
        conn,
        SERIES_COLUMNS,
        "name LIKE ?1 ESCAPE '\\'",
        "start_date DESC, name",
        opts,
        row_to_series,
    )
}

// ── Matches ─────────────────────────────────────────────────────────────────

const MATCH_COLUMNS: &str = "SELECT m.id, m.external_id, m.series_id, m.team1_id, m.team2_id,
        m.venue_id, m.match_date, m.format, m.description, m.toss_winner_id,
        m.toss_decision, m.winner_id, m.victory_margin, m.victory_type, m.status
    FROM matches m
    LEFT JOIN teams t1 ON t1.id = m.team1_id
    LEFT JOIN teams t2 ON t2.id = m.team2_id
    LEFT JOIN series s ON s.id = m.series_id";

fn row_to_match(row: &Row<'_>) -> rusqlite::Result<Match> {
    let margin: Option<u32> = row.get(12)?;
    let kind: Option<VictoryType> = opt_enum_col(row, 13)?;
    Ok(Match {
        id: row.get(0)?,
        external_id: row.get(1)?,
        series_id: row.get(2)?,
        team1_id: row.get(3)?,
        team2_id: row.get(4)?,
        venue_id: row.get(5)?,
        match_date: row.get(6)?,
        format: enum_col(row, 7)?,
        description: row.get(8)?,
        toss_winner_id: row.get(9)?,
        toss_decision: opt_enum_col(row, 10)?,
        winner_id: row.get(11)?,
        victory: margin.zip(kind).map(|(margin, kind)| VictoryMargin { margin, kind }),
        status: enum_col(row, 14)?,
    })
}

pub fn get_match(conn: &Connection, id: i64) -> Result<Option<Match>, OperationError> {
    let sql = format!("{MATCH_COLUMNS} WHERE m.id = ?1");
    conn.query_row(&sql, params![id], row_to_match)
        .optional()
        .map_err(Into::into)
}

pub fn find_match_by_external_id(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<Match>, OperationError> {
    let sql = format!("{MATCH_COLUMNS} WHERE m.external_id = ?1");
    conn.query_row(&sql, params![external_id], row_to_match)
        .optional()
        .map_err(Into::into)
}

/// List matches, newest first; the search term matches team, series or description.
pub fn list_matches(conn: &Connection, opts: &ListOptions) -> Result<Vec<Match>, OperationError> {
    list_with(
        conn,
        MATCH_COLUMNS,
        "(t1.name LIKE ?1 ESCAPE '\\' OR t2.name LIKE ?1 ESCAPE '\\'
          OR s.name LIKE ?1 ESCAPE '\\' OR m.description LIKE ?1 ESCAPE '\\')",
        "m.match_date DESC, m.id DESC",
        opts,
        row_to_match,
    )
}

// ── Performances ────────────────────────────────────────────────────────────

pub fn list_batting_for_match(
    conn: &Connection,
    match_id: i64,
) -> Result<Vec<BattingPerformance>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, match_id, player_id, innings, batting_position, runs, balls_faced,
                fours, sixes, dismissed, strike_rate
         FROM batting_performance WHERE match_id = ?1
         ORDER BY innings, batting_position",
    )?;
    let rows = stmt.query_map(params![match_id], |row| {
        Ok(BattingPerformance {
            id: row.get(0)?,
            match_id: row.get(1)?,
            player_id: row.get(2)?,
            innings: row.get(3)?,
            batting_position: row.get(4)?,
            runs: row.get(5)?,
            balls_faced: row.get(6)?,
            fours: row.get(7)?,
            sixes: row.get(8)?,
            dismissed: row.get(9)?,
            strike_rate: row.get(10)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn list_bowling_for_match(
    conn: &Connection,
    match_id: i64,
) -> Result<Vec<BowlingPerformance>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, match_id, player_id, innings, overs, maidens, runs_conceded,
                wickets, economy_rate
         FROM bowling_performance WHERE match_id = ?1
         ORDER BY innings, id",
    )?;
    let rows = stmt.query_map(params![match_id], |row| {
        Ok(BowlingPerformance {
            id: row.get(0)?,
            match_id: row.get(1)?,
            player_id: row.get(2)?,
            innings: row.get(3)?,
            overs: row.get(4)?,
            maidens: row.get(5)?,
            runs_conceded: row.get(6)?,
            wickets: row.get(7)?,
            economy_rate: row.get(8)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Whether the batting positions recorded for an innings run 1..=n without gaps.
pub fn innings_positions_contiguous(
    conn: &Connection,
    match_id: i64,
    innings: u32,
) -> Result<bool, OperationError> {
    let (count, max): (u32, Option<u32>) = conn.query_row(
        "SELECT COUNT(*), MAX(batting_position) FROM batting_performance
         WHERE match_id = ?1 AND innings = ?2",
        params![match_id, innings],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(max.unwrap_or(0) == count)
}

// ── Career Aggregates ───────────────────────────────────────────────────────

/// Career aggregates for a player, one entry per format played, recomputed
/// from performance rows. `format` restricts the result to one format.
pub fn player_career(
    conn: &Connection,
    player_id: i64,
    format: Option<MatchFormat>,
) -> Result<Vec<PlayerCareer>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT player_id, format, total_matches, total_innings, total_runs, balls_faced,
                highest_score, hundreds, fifties, batting_average, strike_rate,
                total_wickets, bowling_average, economy_rate
         FROM player_career_stats
         WHERE player_id = ?1 AND (?2 IS NULL OR format = ?2)
         ORDER BY CASE format WHEN 'Test' THEN 1 WHEN 'ODI' THEN 2 ELSE 3 END",
    )?;
    let rows = stmt.query_map(params![player_id, format.map(|f| f.as_str())], |row| {
        Ok(PlayerCareer {
            player_id: row.get(0)?,
            format: enum_col(row, 1)?,
            matches: row.get(2)?,
            innings: row.get(3)?,
            runs: row.get(4)?,
            balls_faced: row.get(5)?,
            highest_score: row.get(6)?,
            hundreds: row.get(7)?,
            fifties: row.get(8)?,
            batting_average: row.get(9)?,
            strike_rate: row.get(10)?,
            wickets: row.get(11)?,
            bowling_average: row.get(12)?,
            economy_rate: row.get(13)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Row counts across the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub teams: i64,
    pub venues: i64,
    pub players: i64,
    pub series: i64,
    pub matches: i64,
    pub completed_matches: i64,
    pub batting_rows: i64,
    pub bowling_rows: i64,
    pub ingest_batches: i64,
}

pub fn database_stats(conn: &Connection) -> Result<DatabaseStats, OperationError> {
    let count = |sql: &str| -> Result<i64, rusqlite::Error> { conn.query_row(sql, [], |r| r.get(0)) };
    Ok(DatabaseStats {
        teams: count("SELECT COUNT(*) FROM teams")?,
        venues: count("SELECT COUNT(*) FROM venues")?,
        players: count("SELECT COUNT(*) FROM players")?,
        series: count("SELECT COUNT(*) FROM series")?,
        matches: count("SELECT COUNT(*) FROM matches")?,
        completed_matches: count("SELECT COUNT(*) FROM matches WHERE status = 'Completed'")?,
        batting_rows: count("SELECT COUNT(*) FROM batting_performance")?,
        bowling_rows: count("SELECT COUNT(*) FROM bowling_performance")?,
        ingest_batches: count("SELECT COUNT(*) FROM ingest_log")?,
    })
}

/// An ingestion batch as recorded in `ingest_log`.
#[derive(Debug, Clone)]
pub struct IngestLogEntry {
    pub id: i64,
    pub source: String,
    pub feed: String,
    pub ingested_at: String,
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub skipped: u32,
}

/// Most recent ingestion batches first.
pub fn list_ingest_logs(conn: &Connection, limit: u32) -> Result<Vec<IngestLogEntry>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, source, feed, ingested_at, records_created, records_updated,
                records_unchanged, records_skipped
         FROM ingest_log ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(IngestLogEntry {
            id: row.get(0)?,
            source: row.get(1)?,
            feed: row.get(2)?,
            ingested_at: row.get(3)?,
            created: row.get(4)?,
            updated: row.get(5)?,
            unchanged: row.get(6)?,
            skipped: row.get(7)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
