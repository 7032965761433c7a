//! Create, update and delete operations for all entity types.
//!
//! Every write validates its input before touching the database and reports
//! duplicate keys as [`OperationError::Conflict`]. Deletes are gated on an
//! explicit [`Confirmation`].

use std::collections::BTreeSet;

use cricstat_catalog::types::*;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, ErrorCode};
use thiserror::Error;

use crate::queries::{
    get_match, get_player, get_series, get_team, get_venue, innings_positions_contiguous,
};

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: &'static str, id: String },
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("Conflict: {entity_type} '{key}' already exists")]
    Conflict { entity_type: &'static str, key: String },
    #[error("Deleting {entity_type} {id} requires confirmation")]
    ConfirmationRequired { entity_type: &'static str, id: i64 },
}

impl OperationError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound {
            entity_type: kind.label(),
            id: id.to_string(),
        }
    }
}

/// Whether the caller has confirmed a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Unconfirmed,
    Confirmed,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

/// The entity types exposed through CRUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Team,
    Venue,
    Series,
    Match,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Team => "team",
            Self::Venue => "venue",
            Self::Series => "series",
            Self::Match => "match",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Self::Player => "players",
            Self::Team => "teams",
            Self::Venue => "venues",
            Self::Series => "series",
            Self::Match => "matches",
        }
    }
}

/// Rows affected by deleting an entity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteImpact {
    /// Matches whose reference will be cleared (team/venue/series) or removed (match).
    pub matches: u32,
    /// Players whose team reference will be cleared.
    pub players: u32,
    /// Performance rows that will be removed.
    pub performances: u32,
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Map unique-constraint failures to `Conflict`; pass everything else through.
fn conflict_or(err: rusqlite::Error, kind: EntityKind, key: &str) -> OperationError {
    if let rusqlite::Error::SqliteFailure(ref e, _) = err {
        if e.code == ErrorCode::ConstraintViolation
            && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        {
            return OperationError::Conflict {
                entity_type: kind.label(),
                key: key.to_string(),
            };
        }
    }
    err.into()
}

fn required(field: &'static str, value: &str) -> Result<String, OperationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OperationError::invalid(field, "is required"));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn exists(conn: &Connection, kind: EntityKind, id: i64) -> Result<bool, OperationError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", kind.table());
    Ok(conn.query_row(&sql, [id], |row| row.get(0))?)
}

fn ensure_exists(
    conn: &Connection,
    kind: EntityKind,
    field: &'static str,
    id: Option<i64>,
) -> Result<(), OperationError> {
    match id {
        Some(id) if !exists(conn, kind, id)? => Err(OperationError::invalid(
            field,
            format!("no {} with id {}", kind.label(), id),
        )),
        _ => Ok(()),
    }
}

/// Resolve a patch on a required text column. Returns the new value only when it changes.
fn required_patch(
    field: &'static str,
    patch: &Patch<String>,
    current: &str,
) -> Result<Option<String>, OperationError> {
    match patch {
        Patch::Keep => Ok(None),
        Patch::Clear => Err(OperationError::invalid(field, "is required and cannot be cleared")),
        Patch::Set(v) if v.trim().is_empty() => Ok(None),
        Patch::Set(v) => {
            let v = v.trim().to_string();
            Ok((v != current).then_some(v))
        }
    }
}

/// Resolve a patch on an optional text column; blank input leaves the value alone.
fn text_patch(patch: &Patch<String>, current: &Option<String>) -> Option<Option<String>> {
    match patch {
        Patch::Set(v) if v.trim().is_empty() => None,
        Patch::Set(v) => Patch::Set(v.trim().to_string()).apply_optional(current),
        other => other.apply_optional(current),
    }
}

fn required_value<T: PartialEq + Clone>(
    field: &'static str,
    patch: &Patch<T>,
    current: &T,
) -> Result<Option<T>, OperationError> {
    match patch {
        Patch::Keep => Ok(None),
        Patch::Clear => Err(OperationError::invalid(field, "is required and cannot be cleared")),
        Patch::Set(v) => Ok((v != current).then(|| v.clone())),
    }
}

/// Column assignments collected for a single UPDATE.
#[derive(Default)]
struct Changes {
    columns: Vec<&'static str>,
    values: Vec<Box<dyn ToSql>>,
}

impl Changes {
    fn set<T: ToSql + 'static>(&mut self, column: &'static str, value: T) {
        self.columns.push(column);
        self.values.push(Box::new(value));
    }

    /// Write the collected columns. Returns the names of the changed columns.
    fn apply(
        mut self,
        conn: &Connection,
        kind: EntityKind,
        id: i64,
        touch: bool,
    ) -> Result<Vec<&'static str>, rusqlite::Error> {
        if self.columns.is_empty() {
            return Ok(Vec::new());
        }
        let mut assignments: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ?{}", i + 1))
            .collect();
        if touch {
            assignments.push("updated_at = datetime('now')".to_string());
        }
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            kind.table(),
            assignments.join(", "),
            self.columns.len() + 1
        );
        self.values.push(Box::new(id));
        let refs: Vec<&dyn ToSql> = self.values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&sql, refs.as_slice())?;
        Ok(self.columns)
    }
}

fn delete_row(
    conn: &Connection,
    kind: EntityKind,
    id: i64,
    confirm: Confirmation,
) -> Result<(), OperationError> {
    if !exists(conn, kind, id)? {
        return Err(OperationError::not_found(kind, id));
    }
    if confirm != Confirmation::Confirmed {
        return Err(OperationError::ConfirmationRequired {
            entity_type: kind.label(),
            id,
        });
    }
    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
    conn.execute(&sql, [id])?;
    log::debug!("Deleted {} {}", kind.label(), id);
    Ok(())
}

/// Count the rows a delete would affect, for display before confirming.
pub fn delete_impact(
    conn: &Connection,
    kind: EntityKind,
    id: i64,
) -> Result<DeleteImpact, OperationError> {
    if !exists(conn, kind, id)? {
        return Err(OperationError::not_found(kind, id));
    }
    let count = |sql: &str| -> Result<u32, rusqlite::Error> {
        conn.query_row(sql, [id], |row| row.get(0))
    };
    let impact = match kind {
        EntityKind::Player => DeleteImpact {
            performances: count(
                "SELECT (SELECT COUNT(*) FROM batting_performance WHERE player_id = ?1)
                      + (SELECT COUNT(*) FROM bowling_performance WHERE player_id = ?1)",
            )?,
            ..Default::default()
        },
        EntityKind::Team => DeleteImpact {
            matches: count(
                "SELECT COUNT(*) FROM matches
                 WHERE team1_id = ?1 OR team2_id = ?1 OR toss_winner_id = ?1 OR winner_id = ?1",
            )?,
            players: count("SELECT COUNT(*) FROM players WHERE team_id = ?1")?,
            ..Default::default()
        },
        EntityKind::Venue => DeleteImpact {
            matches: count("SELECT COUNT(*) FROM matches WHERE venue_id = ?1")?,
            ..Default::default()
        },
        EntityKind::Series => DeleteImpact {
            matches: count("SELECT COUNT(*) FROM matches WHERE series_id = ?1")?,
            ..Default::default()
        },
        EntityKind::Match => DeleteImpact {
            matches: 1,
            performances: count(
                "SELECT (SELECT COUNT(*) FROM batting_performance WHERE match_id = ?1)
                      + (SELECT COUNT(*) FROM bowling_performance WHERE match_id = ?1)",
            )?,
            ..Default::default()
        },
    };
    Ok(impact)
}

// ── Team Operations ─────────────────────────────────────────────────────────

/// Insert a team. Names are unique, ignoring case.
pub fn insert_team(conn: &Connection, team: &NewTeam) -> Result<i64, OperationError> {
    let name = required("name", &team.name)?;
    let country = required("country", &team.country)?;
    conn.execute(
        "INSERT INTO teams (name, country) VALUES (?1, ?2)",
        params![name, country],
    )
    .map_err(|e| conflict_or(e, EntityKind::Team, &name))?;
    Ok(conn.last_insert_rowid())
}

/// Apply a patch to a team. Returns the changed column names.
pub fn update_team(
    conn: &Connection,
    id: i64,
    patch: &TeamPatch,
) -> Result<Vec<&'static str>, OperationError> {
    let current = get_team(conn, id)?.ok_or_else(|| OperationError::not_found(EntityKind::Team, id))?;
    let mut changes = Changes::default();
    let mut key = current.name.clone();
    if let Some(name) = required_patch("name", &patch.name, &current.name)? {
        key = name.clone();
        changes.set("name", name);
    }
    if let Some(country) = required_patch("country", &patch.country, &current.country)? {
        changes.set("country", country);
    }
    changes
        .apply(conn, EntityKind::Team, id, true)
        .map_err(|e| conflict_or(e, EntityKind::Team, &key))
}

/// Delete a team. Matches and players referencing it keep their rows with the
/// reference cleared.
pub fn delete_team(conn: &Connection, id: i64, confirm: Confirmation) -> Result<(), OperationError> {
    delete_row(conn, EntityKind::Team, id, confirm)
}

/// Recompute every team's match, win and loss counters from completed matches.
///
/// This is the only writer of those counters. Returns the number of teams updated.
pub fn refresh_team_records(conn: &Connection) -> Result<usize, OperationError> {
    let updated = conn.execute(
        "UPDATE teams SET
             total_matches = (
                 SELECT COUNT(*) FROM matches m
                 WHERE (m.team1_id = teams.id OR m.team2_id = teams.id)
                   AND m.status = 'Completed'),
             total_wins = (
                 SELECT COUNT(*) FROM matches m
                 WHERE m.winner_id = teams.id AND m.status = 'Completed'),
             total_losses = (
                 SELECT COUNT(*) FROM matches m
                 WHERE (m.team1_id = teams.id OR m.team2_id = teams.id)
                   AND m.status = 'Completed'
                   AND m.winner_id IS NOT NULL
                   AND m.winner_id <> teams.id),
             updated_at = datetime('now')",
        [],
    )?;
    log::debug!("Refreshed records for {} teams", updated);
    Ok(updated)
}

// ── Venue Operations ────────────────────────────────────────────────────────

/// Insert a venue. `(name, city)` is unique, ignoring case.
pub fn insert_venue(conn: &Connection, venue: &NewVenue) -> Result<i64, OperationError> {
    let name = required("name", &venue.name)?;
    let city = required("city", &venue.city)?;
    let country = required("country", &venue.country)?;
    conn.execute(
        "INSERT INTO venues (name, city, country, capacity) VALUES (?1, ?2, ?3, ?4)",
        params![name, city, country, venue.capacity],
    )
    .map_err(|e| conflict_or(e, EntityKind::Venue, &format!("{name}, {city}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn update_venue(
    conn: &Connection,
    id: i64,
    patch: &VenuePatch,
) -> Result<Vec<&'static str>, OperationError> {
    let current = get_venue(conn, id)?.ok_or_else(|| OperationError::not_found(EntityKind::Venue, id))?;
    let mut changes = Changes::default();
    if let Some(name) = required_patch("name", &patch.name, &current.name)? {
        changes.set("name", name);
    }
    if let Some(city) = required_patch("city", &patch.city, &current.city)? {
        changes.set("city", city);
    }
    if let Some(country) = required_patch("country", &patch.country, &current.country)? {
        changes.set("country", country);
    }
    if let Some(capacity) = patch.capacity.apply_optional(&current.capacity) {
        changes.set("capacity", capacity);
    }
    changes
        .apply(conn, EntityKind::Venue, id, false)
        .map_err(|e| conflict_or(e, EntityKind::Venue, &current.name))
}

/// Delete a venue. Matches played there keep their rows with `venue_id` cleared.
pub fn delete_venue(conn: &Connection, id: i64, confirm: Confirmation) -> Result<(), OperationError> {
    delete_row(conn, EntityKind::Venue, id, confirm)
}

// ── Player Operations ───────────────────────────────────────────────────────

pub fn insert_player(conn: &Connection, player: &NewPlayer) -> Result<i64, OperationError> {
    let full_name = required("full_name", &player.full_name)?;
    let country = required("country", &player.country)?;
    ensure_exists(conn, EntityKind::Team, "team_id", player.team_id)?;
    let external_id = optional(&player.external_id);
    conn.execute(
        "INSERT INTO players (external_id, full_name, country, playing_role,
             batting_style, bowling_style, team_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            external_id,
            full_name,
            country,
            player.playing_role.as_str(),
            optional(&player.batting_style),
            optional(&player.bowling_style),
            player.team_id,
        ],
    )
    .map_err(|e| {
        conflict_or(
            e,
            EntityKind::Player,
            external_id.as_deref().unwrap_or(&full_name),
        )
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn update_player(
    conn: &Connection,
    id: i64,
    patch: &PlayerPatch,
) -> Result<Vec<&'static str>, OperationError> {
    let current =
        get_player(conn, id)?.ok_or_else(|| OperationError::not_found(EntityKind::Player, id))?;
    let mut changes = Changes::default();
    if let Some(name) = required_patch("full_name", &patch.full_name, &current.full_name)? {
        changes.set("full_name", name);
    }
    if let Some(country) = required_patch("country", &patch.country, &current.country)? {
        changes.set("country", country);
    }
    if let Some(role) = required_value("playing_role", &patch.playing_role, &current.playing_role)? {
        changes.set("playing_role", role.as_str());
    }
    if let Some(style) = text_patch(&patch.batting_style, &current.batting_style) {
        changes.set("batting_style", style);
    }
    if let Some(style) = text_patch(&patch.bowling_style, &current.bowling_style) {
        changes.set("bowling_style", style);
    }
    if let Some(team_id) = patch.team_id.apply_optional(&current.team_id) {
        ensure_exists(conn, EntityKind::Team, "team_id", team_id)?;
        changes.set("team_id", team_id);
    }
    Ok(changes.apply(conn, EntityKind::Player, id, true)?)
}

/// Delete a player together with their batting and bowling rows.
pub fn delete_player(
    conn: &Connection,
    id: i64,
    confirm: Confirmation,
) -> Result<(), OperationError> {
    delete_row(conn, EntityKind::Player, id, confirm)
}

// ── Series Operations ───────────────────────────────────────────────────────

fn check_series_dates(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> Result<(), OperationError> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(OperationError::invalid(
            "end_date",
            format!("{e} is before start date {s}"),
        )),
        _ => Ok(()),
    }
}

pub fn insert_series(conn: &Connection, series: &NewSeries) -> Result<i64, OperationError> {
    let name = required("name", &series.name)?;
    check_series_dates(series.start_date, series.end_date)?;
    conn.execute(
        "INSERT INTO series (external_id, name, host_country, match_type,
             start_date, end_date, total_matches)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            optional(&series.external_id),
            name,
            optional(&series.host_country),
            series.match_type.map(|f| f.as_str()),
            series.start_date,
            series.end_date,
            series.total_matches,
        ],
    )
    .map_err(|e| conflict_or(e, EntityKind::Series, &name))?;
    Ok(conn.last_insert_rowid())
}

pub fn update_series(
    conn: &Connection,
    id: i64,
    patch: &SeriesPatch,
) -> Result<Vec<&'static str>, OperationError> {
    let current =
        get_series(conn, id)?.ok_or_else(|| OperationError::not_found(EntityKind::Series, id))?;
    let mut changes = Changes::default();
    let mut key = current.name.clone();
    if let Some(name) = required_patch("name", &patch.name, &current.name)? {
        key = name.clone();
        changes.set("name", name);
    }
    if let Some(host) = text_patch(&patch.host_country, &current.host_country) {
        changes.set("host_country", host);
    }
    if let Some(kind) = patch.match_type.apply_optional(&current.match_type) {
        changes.set("match_type", kind.map(|f| f.as_str()));
    }
    let start = patch.start_date.apply_optional(&current.start_date);
    let end = patch.end_date.apply_optional(&current.end_date);
    check_series_dates(
        start.unwrap_or(current.start_date),
        end.unwrap_or(current.end_date),
    )?;
    if let Some(start) = start {
        changes.set("start_date", start);
    }
    if let Some(end) = end {
        changes.set("end_date", end);
    }
    if let Some(total) = patch.total_matches.apply_optional(&current.total_matches) {
        changes.set("total_matches", total);
    }
    changes
        .apply(conn, EntityKind::Series, id, false)
        .map_err(|e| conflict_or(e, EntityKind::Series, &key))
}

/// Delete a series. Its matches keep their rows with `series_id` cleared.
pub fn delete_series(
    conn: &Connection,
    id: i64,
    confirm: Confirmation,
) -> Result<(), OperationError> {
    delete_row(conn, EntityKind::Series, id, confirm)
}

// ── Match Operations ────────────────────────────────────────────────────────

/// Check the team invariants of a match: distinct sides, and a winner and
/// toss winner drawn from those sides.
fn check_match_teams(
    team1: Option<i64>,
    team2: Option<i64>,
    toss_winner: Option<i64>,
    winner: Option<i64>,
) -> Result<(), OperationError> {
    if team1.is_some() && team1 == team2 {
        return Err(OperationError::invalid("team2_id", "must differ from team1_id"));
    }
    let plays = |id: i64| Some(id) == team1 || Some(id) == team2;
    if let Some(w) = winner.filter(|w| !plays(*w)) {
        return Err(OperationError::invalid(
            "winner_id",
            format!("team {w} did not play in this match"),
        ));
    }
    if let Some(t) = toss_winner.filter(|t| !plays(*t)) {
        return Err(OperationError::invalid(
            "toss_winner_id",
            format!("team {t} did not play in this match"),
        ));
    }
    Ok(())
}

pub fn insert_match(conn: &Connection, m: &NewMatch) -> Result<i64, OperationError> {
    check_match_teams(Some(m.team1_id), Some(m.team2_id), m.toss_winner_id, m.winner_id)?;
    ensure_exists(conn, EntityKind::Team, "team1_id", Some(m.team1_id))?;
    ensure_exists(conn, EntityKind::Team, "team2_id", Some(m.team2_id))?;
    ensure_exists(conn, EntityKind::Venue, "venue_id", m.venue_id)?;
    ensure_exists(conn, EntityKind::Series, "series_id", m.series_id)?;
    let external_id = optional(&m.external_id);
    conn.execute(
        "INSERT INTO matches (external_id, series_id, team1_id, team2_id, venue_id,
             match_date, format, description, toss_winner_id, toss_decision,
             winner_id, victory_margin, victory_type, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            external_id,
            m.series_id,
            m.team1_id,
            m.team2_id,
            m.venue_id,
            m.match_date,
            m.format.as_str(),
            optional(&m.description),
            m.toss_winner_id,
            m.toss_decision.map(|d| d.as_str()),
            m.winner_id,
            m.victory.map(|v| v.margin),
            m.victory.map(|v| v.kind.as_str()),
            m.status.as_str(),
        ],
    )
    .map_err(|e| {
        let key = external_id
            .clone()
            .unwrap_or_else(|| format!("{} on {}", m.format, m.match_date));
        conflict_or(e, EntityKind::Match, &key)
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn update_match(
    conn: &Connection,
    id: i64,
    patch: &MatchPatch,
) -> Result<Vec<&'static str>, OperationError> {
    let current = get_match(conn, id)?.ok_or_else(|| OperationError::not_found(EntityKind::Match, id))?;

    let team1 = patch.team1_id.apply_optional(&current.team1_id);
    let team2 = patch.team2_id.apply_optional(&current.team2_id);
    let toss_winner = patch.toss_winner_id.apply_optional(&current.toss_winner_id);
    let winner = patch.winner_id.apply_optional(&current.winner_id);
    check_match_teams(
        team1.unwrap_or(current.team1_id),
        team2.unwrap_or(current.team2_id),
        toss_winner.unwrap_or(current.toss_winner_id),
        winner.unwrap_or(current.winner_id),
    )?;

    let mut changes = Changes::default();
    if let Some(series) = patch.series_id.apply_optional(&current.series_id) {
        ensure_exists(conn, EntityKind::Series, "series_id", series)?;
        changes.set("series_id", series);
    }
    if let Some(team1) = team1 {
        ensure_exists(conn, EntityKind::Team, "team1_id", team1)?;
        changes.set("team1_id", team1);
    }
    if let Some(team2) = team2 {
        ensure_exists(conn, EntityKind::Team, "team2_id", team2)?;
        changes.set("team2_id", team2);
    }
    if let Some(venue) = patch.venue_id.apply_optional(&current.venue_id) {
        ensure_exists(conn, EntityKind::Venue, "venue_id", venue)?;
        changes.set("venue_id", venue);
    }
    if let Some(date) = required_value("match_date", &patch.match_date, &current.match_date)? {
        changes.set("match_date", date);
    }
    if let Some(format) = required_value("format", &patch.format, &current.format)? {
        changes.set("format", format.as_str());
    }
    if let Some(desc) = text_patch(&patch.description, &current.description) {
        changes.set("description", desc);
    }
    if let Some(toss_winner) = toss_winner {
        changes.set("toss_winner_id", toss_winner);
    }
    if let Some(decision) = patch.toss_decision.apply_optional(&current.toss_decision) {
        changes.set("toss_decision", decision.map(|d| d.as_str()));
    }
    if let Some(winner) = winner {
        changes.set("winner_id", winner);
    }
    if let Some(victory) = patch.victory.apply_optional(&current.victory) {
        changes.set("victory_margin", victory.map(|v| v.margin));
        changes.set("victory_type", victory.map(|v| v.kind.as_str()));
    }
    if let Some(status) = required_value("status", &patch.status, &current.status)? {
        changes.set("status", status.as_str());
    }
    Ok(changes.apply(conn, EntityKind::Match, id, true)?)
}

/// Delete a match together with its performance rows.
pub fn delete_match(conn: &Connection, id: i64, confirm: Confirmation) -> Result<(), OperationError> {
    delete_row(conn, EntityKind::Match, id, confirm)
}

// ── Performance Operations ──────────────────────────────────────────────────

fn check_innings(innings: u32) -> Result<(), OperationError> {
    if !(1..=4).contains(&innings) {
        return Err(OperationError::invalid("innings", "must be between 1 and 4"));
    }
    Ok(())
}

/// Insert a batting row. The strike rate is derived by the database.
pub fn insert_batting(conn: &Connection, row: &NewBatting) -> Result<i64, OperationError> {
    check_innings(row.innings)?;
    if !(1..=11).contains(&row.batting_position) {
        return Err(OperationError::invalid(
            "batting_position",
            "must be between 1 and 11",
        ));
    }
    ensure_exists(conn, EntityKind::Match, "match_id", Some(row.match_id))?;
    ensure_exists(conn, EntityKind::Player, "player_id", Some(row.player_id))?;
    conn.execute(
        "INSERT INTO batting_performance (match_id, player_id, innings, batting_position,
             runs, balls_faced, fours, sixes, dismissed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            row.match_id,
            row.player_id,
            row.innings,
            row.batting_position,
            row.runs,
            row.balls_faced,
            row.fours,
            row.sixes,
            row.dismissed,
        ],
    )
    .map_err(|e| {
        let key = format!(
            "match {} innings {} position {}",
            row.match_id, row.innings, row.batting_position
        );
        conflict_or(e, EntityKind::Match, &key)
    })?;
    Ok(conn.last_insert_rowid())
}

/// Insert a bowling row. The economy rate is derived by the database.
pub fn insert_bowling(conn: &Connection, row: &NewBowling) -> Result<i64, OperationError> {
    check_innings(row.innings)?;
    if !row.overs.is_finite() || row.overs < 0.0 {
        return Err(OperationError::invalid("overs", "must be a non-negative number"));
    }
    if row.wickets > 10 {
        return Err(OperationError::invalid("wickets", "must be at most 10"));
    }
    ensure_exists(conn, EntityKind::Match, "match_id", Some(row.match_id))?;
    ensure_exists(conn, EntityKind::Player, "player_id", Some(row.player_id))?;
    conn.execute(
        "INSERT INTO bowling_performance (match_id, player_id, innings, overs,
             maidens, runs_conceded, wickets)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            row.match_id,
            row.player_id,
            row.innings,
            row.overs,
            row.maidens,
            row.runs_conceded,
            row.wickets,
        ],
    )
    .map_err(|e| {
        let key = format!(
            "match {} innings {} bowler {}",
            row.match_id, row.innings, row.player_id
        );
        conflict_or(e, EntityKind::Match, &key)
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_batting(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM batting_performance WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "batting performance",
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_bowling(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM bowling_performance WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "bowling performance",
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Ingest Log ──────────────────────────────────────────────────────────────

/// Counts recorded for one ingestion batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounts {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub skipped: u32,
}

pub fn insert_ingest_log(
    conn: &Connection,
    source: &str,
    feed: &str,
    counts: &BatchCounts,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO ingest_log (source, feed, records_created, records_updated,
             records_unchanged, records_skipped)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            source,
            feed,
            counts.created,
            counts.updated,
            counts.unchanged,
            counts.skipped,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Seeding ─────────────────────────────────────────────────────────────────

/// Upsert a hand-curated dataset, keeping the ids it declares.
///
/// Runs in one transaction and finishes with [`refresh_team_records`], so
/// counters in the dataset are ignored. Safe to repeat.
pub fn seed_from_dataset(
    conn: &Connection,
    data: &SampleDataset,
) -> Result<SeedStats, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let mut stats = SeedStats::default();

    for team in &data.teams {
        tx.execute(
            "INSERT INTO teams (id, name, country) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 country = excluded.country,
                 updated_at = datetime('now')",
            params![team.id, required("name", &team.name)?, team.country],
        )
        .map_err(|e| conflict_or(e, EntityKind::Team, &team.name))?;
        stats.teams += 1;
    }

    for venue in &data.venues {
        tx.execute(
            "INSERT INTO venues (id, name, city, country, capacity) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 city = excluded.city,
                 country = excluded.country,
                 capacity = excluded.capacity",
            params![venue.id, venue.name, venue.city, venue.country, venue.capacity],
        )
        .map_err(|e| conflict_or(e, EntityKind::Venue, &venue.name))?;
        stats.venues += 1;
    }

    for s in &data.series {
        check_series_dates(s.start_date, s.end_date)?;
        tx.execute(
            "INSERT INTO series (id, external_id, name, host_country, match_type,
                 start_date, end_date, total_matches)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 external_id = excluded.external_id,
                 name = excluded.name,
                 host_country = excluded.host_country,
                 match_type = excluded.match_type,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date,
                 total_matches = excluded.total_matches",
            params![
                s.id,
                s.external_id,
                s.name,
                s.host_country,
                s.match_type.map(|f| f.as_str()),
                s.start_date,
                s.end_date,
                s.total_matches,
            ],
        )
        .map_err(|e| conflict_or(e, EntityKind::Series, &s.name))?;
        stats.series += 1;
    }

    for p in &data.players {
        tx.execute(
            "INSERT INTO players (id, external_id, full_name, country, playing_role,
                 batting_style, bowling_style, team_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 external_id = excluded.external_id,
                 full_name = excluded.full_name,
                 country = excluded.country,
                 playing_role = excluded.playing_role,
                 batting_style = excluded.batting_style,
                 bowling_style = excluded.bowling_style,
                 team_id = excluded.team_id,
                 updated_at = datetime('now')",
            params![
                p.id,
                p.external_id,
                p.full_name,
                p.country,
                p.playing_role.as_str(),
                p.batting_style,
                p.bowling_style,
                p.team_id,
            ],
        )
        .map_err(|e| conflict_or(e, EntityKind::Player, &p.full_name))?;
        stats.players += 1;
    }

    for m in &data.matches {
        check_match_teams(m.team1_id, m.team2_id, m.toss_winner_id, m.winner_id)?;
        tx.execute(
            "INSERT INTO matches (id, external_id, series_id, team1_id, team2_id, venue_id,
                 match_date, format, description, toss_winner_id, toss_decision,
                 winner_id, victory_margin, victory_type, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                 external_id = excluded.external_id,
                 series_id = excluded.series_id,
                 team1_id = excluded.team1_id,
                 team2_id = excluded.team2_id,
                 venue_id = excluded.venue_id,
                 match_date = excluded.match_date,
                 format = excluded.format,
                 description = excluded.description,
                 toss_winner_id = excluded.toss_winner_id,
                 toss_decision = excluded.toss_decision,
                 winner_id = excluded.winner_id,
                 victory_margin = excluded.victory_margin,
                 victory_type = excluded.victory_type,
                 status = excluded.status,
                 updated_at = datetime('now')",
            params![
                m.id,
                m.external_id,
                m.series_id,
                m.team1_id,
                m.team2_id,
                m.venue_id,
                m.match_date,
                m.format.as_str(),
                m.description,
                m.toss_winner_id,
                m.toss_decision.map(|d| d.as_str()),
                m.winner_id,
                m.victory.map(|v| v.margin),
                m.victory.map(|v| v.kind.as_str()),
                m.status.as_str(),
            ],
        )
        .map_err(|e| conflict_or(e, EntityKind::Match, &m.id.to_string()))?;
        stats.matches += 1;
    }

    for b in &data.batting {
        tx.execute(
            "INSERT INTO batting_performance (match_id, player_id, innings, batting_position,
                 runs, balls_faced, fours, sixes, dismissed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(match_id, innings, player_id) DO UPDATE SET
                 batting_position = excluded.batting_position,
                 runs = excluded.runs,
                 balls_faced = excluded.balls_faced,
                 fours = excluded.fours,
                 sixes = excluded.sixes,
                 dismissed = excluded.dismissed",
            params![
                b.match_id,
                b.player_id,
                b.innings,
                b.batting_position,
                b.runs,
                b.balls_faced,
                b.fours,
                b.sixes,
                b.dismissed,
            ],
        )?;
        stats.batting += 1;
    }

    // Partnership queries only pair adjacent positions, so gaps hide pairs.
    let innings: BTreeSet<(i64, u32)> =
        data.batting.iter().map(|b| (b.match_id, b.innings)).collect();
    for (match_id, number) in innings {
        if !innings_positions_contiguous(&tx, match_id, number)? {
            log::warn!(
                "Match {} innings {}: batting positions are not contiguous from 1",
                match_id,
                number
            );
            stats.position_gaps.push((match_id, number));
        }
    }

    for w in &data.bowling {
        tx.execute(
            "INSERT INTO bowling_performance (match_id, player_id, innings, overs,
                 maidens, runs_conceded, wickets)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(match_id, innings, player_id) DO UPDATE SET
                 overs = excluded.overs,
                 maidens = excluded.maidens,
                 runs_conceded = excluded.runs_conceded,
                 wickets = excluded.wickets",
            params![
                w.match_id,
                w.player_id,
                w.innings,
                w.overs,
                w.maidens,
                w.runs_conceded,
                w.wickets,
            ],
        )?;
        stats.bowling += 1;
    }

    refresh_team_records(&tx)?;
    tx.commit()?;
    Ok(stats)
}

/// Statistics from seeding a dataset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedStats {
    pub teams: usize,
    pub venues: usize,
    pub series: usize,
    pub players: usize,
    pub matches: usize,
    pub batting: usize,
    pub bowling: usize,
    /// `(match_id, innings)` pairs whose batting positions skip a number.
    pub position_gaps: Vec<(i64, u32)>,
}
