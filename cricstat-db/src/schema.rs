//! SQLite schema creation and migration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Connection settings, built once at startup and handed to [`open_database`].
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Create all tables, indexes and views if they don't exist.
///
/// This is idempotent: safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? != CURRENT_VERSION {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Open or create a statistics database as described by `config`.
pub fn open_database(config: &DatabaseConfig) -> Result<Connection, SchemaError> {
    open_path(&config.path, config.busy_timeout)
}

fn open_path(path: &Path, busy_timeout: Duration) -> Result<Connection, SchemaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        // Let SQLite report the failure if the directory can't be created.
        let _ = std::fs::create_dir_all(parent);
    }
    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        log::debug!("Creating schema v{} in {}", CURRENT_VERSION, path.display());
        create_schema(&conn)?;
    } else if version != CURRENT_VERSION {
        migrate(&conn, version)?;
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// The bundled SQLite library version, e.g. `(3, 46, 0)`.
pub fn sqlite_version(conn: &Connection) -> Result<(u32, u32, u32), SchemaError> {
    let text: String = conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
    let mut parts = text.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    Ok((
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    ))
}

/// Record a schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
pub fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    let mut version = from_version;
    while version < CURRENT_VERSION {
        if version == 1 {
            log::info!("Migrating schema v1 -> v2: adding ingest_log");
            conn.execute_batch(INGEST_LOG_SQL)?;
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

const INGEST_LOG_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS ingest_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    feed TEXT NOT NULL,
    ingested_at TEXT NOT NULL DEFAULT (datetime('now')),
    records_created INTEGER NOT NULL DEFAULT 0,
    records_updated INTEGER NOT NULL DEFAULT 0,
    records_unchanged INTEGER NOT NULL DEFAULT 0,
    records_skipped INTEGER NOT NULL DEFAULT 0
);
"#;

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Teams. Counters are maintained by refresh_team_records only.
CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    country TEXT NOT NULL,
    total_matches INTEGER NOT NULL DEFAULT 0,
    total_wins INTEGER NOT NULL DEFAULT 0,
    total_losses INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS venues (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL COLLATE NOCASE,
    city TEXT NOT NULL COLLATE NOCASE,
    country TEXT NOT NULL,
    capacity INTEGER CHECK (capacity IS NULL OR capacity >= 0),
    UNIQUE (name, city)
);
CREATE INDEX IF NOT EXISTS idx_venues_country ON venues(country);

CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT UNIQUE,
    full_name TEXT NOT NULL COLLATE NOCASE,
    country TEXT NOT NULL,
    playing_role TEXT NOT NULL
        CHECK (playing_role IN ('Batsman', 'Bowler', 'All-rounder', 'Wicket-keeper')),
    batting_style TEXT,
    bowling_style TEXT,
    team_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_players_country ON players(country);
CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);

CREATE TABLE IF NOT EXISTS series (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT UNIQUE,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    host_country TEXT,
    match_type TEXT CHECK (match_type IN ('Test', 'ODI', 'T20I')),
    start_date TEXT,
    end_date TEXT,
    total_matches INTEGER CHECK (total_matches IS NULL OR total_matches >= 0),
    CHECK (start_date IS NULL OR end_date IS NULL OR start_date <= end_date)
);

CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT UNIQUE,
    series_id INTEGER REFERENCES series(id) ON DELETE SET NULL,
    team1_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
    team2_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
    venue_id INTEGER REFERENCES venues(id) ON DELETE SET NULL,
    match_date TEXT NOT NULL,
    format TEXT NOT NULL CHECK (format IN ('Test', 'ODI', 'T20I')),
    description TEXT,
    toss_winner_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
    toss_decision TEXT CHECK (toss_decision IN ('bat', 'field')),
    winner_id INTEGER REFERENCES teams(id) ON DELETE SET NULL,
    victory_margin INTEGER CHECK (victory_margin IS NULL OR victory_margin >= 0),
    victory_type TEXT CHECK (victory_type IN ('runs', 'wickets')),
    status TEXT NOT NULL DEFAULT 'Scheduled'
        CHECK (status IN ('Scheduled', 'Live', 'Completed', 'Abandoned')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (team1_id IS NULL OR team2_id IS NULL OR team1_id <> team2_id),
    -- Relaxed once a side is cleared so ON DELETE SET NULL can run column by column.
    CHECK (winner_id IS NULL OR team1_id IS NULL OR team2_id IS NULL
           OR winner_id IN (team1_id, team2_id)),
    CHECK (toss_winner_id IS NULL OR team1_id IS NULL OR team2_id IS NULL
           OR toss_winner_id IN (team1_id, team2_id)),
    CHECK ((victory_margin IS NULL) = (victory_type IS NULL))
);
CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date);
CREATE INDEX IF NOT EXISTS idx_matches_team1 ON matches(team1_id);
CREATE INDEX IF NOT EXISTS idx_matches_team2 ON matches(team2_id);
CREATE INDEX IF NOT EXISTS idx_matches_venue ON matches(venue_id);
CREATE INDEX IF NOT EXISTS idx_matches_series ON matches(series_id);

-- One row per batsman per innings. strike_rate is derived from the raw counts.
CREATE TABLE IF NOT EXISTS batting_performance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id INTEGER NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    innings INTEGER NOT NULL CHECK (innings BETWEEN 1 AND 4),
    batting_position INTEGER NOT NULL CHECK (batting_position BETWEEN 1 AND 11),
    runs INTEGER NOT NULL DEFAULT 0 CHECK (runs >= 0),
    balls_faced INTEGER NOT NULL DEFAULT 0 CHECK (balls_faced >= 0),
    fours INTEGER NOT NULL DEFAULT 0 CHECK (fours >= 0),
    sixes INTEGER NOT NULL DEFAULT 0 CHECK (sixes >= 0),
    dismissed BOOLEAN NOT NULL DEFAULT 1,
    strike_rate REAL GENERATED ALWAYS AS (
        CASE WHEN balls_faced > 0 THEN ROUND(runs * 100.0 / balls_faced, 2) ELSE 0.0 END
    ) STORED,
    UNIQUE (match_id, innings, batting_position),
    UNIQUE (match_id, innings, player_id)
);
CREATE INDEX IF NOT EXISTS idx_batting_player ON batting_performance(player_id);

-- One row per bowler per innings. economy_rate is derived from the raw counts.
CREATE TABLE IF NOT EXISTS bowling_performance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id INTEGER NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    innings INTEGER NOT NULL CHECK (innings BETWEEN 1 AND 4),
    overs REAL NOT NULL DEFAULT 0 CHECK (overs >= 0),
    maidens INTEGER NOT NULL DEFAULT 0 CHECK (maidens >= 0),
    runs_conceded INTEGER NOT NULL DEFAULT 0 CHECK (runs_conceded >= 0),
    wickets INTEGER NOT NULL DEFAULT 0 CHECK (wickets BETWEEN 0 AND 10),
    economy_rate REAL GENERATED ALWAYS AS (
        CASE WHEN overs > 0 THEN ROUND(runs_conceded / overs, 2) ELSE 0.0 END
    ) STORED,
    UNIQUE (match_id, innings, player_id)
);
CREATE INDEX IF NOT EXISTS idx_bowling_player ON bowling_performance(player_id);

-- Ingestion batch tracking
CREATE TABLE IF NOT EXISTS ingest_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    feed TEXT NOT NULL,
    ingested_at TEXT NOT NULL DEFAULT (datetime('now')),
    records_created INTEGER NOT NULL DEFAULT 0,
    records_updated INTEGER NOT NULL DEFAULT 0,
    records_unchanged INTEGER NOT NULL DEFAULT 0,
    records_skipped INTEGER NOT NULL DEFAULT 0
);

-- Career totals per player and format, always recomputed from performance rows.
CREATE VIEW IF NOT EXISTS player_career_stats AS
WITH bat AS (
    SELECT b.player_id, m.format,
           COUNT(*) AS innings,
           SUM(b.runs) AS runs,
           SUM(b.balls_faced) AS balls,
           SUM(b.dismissed) AS dismissals,
           MAX(b.runs) AS highest_score,
           SUM(b.runs >= 100) AS hundreds,
           SUM(b.runs >= 50 AND b.runs < 100) AS fifties
    FROM batting_performance b
    JOIN matches m ON m.id = b.match_id
    GROUP BY b.player_id, m.format
),
bowl AS (
    SELECT w.player_id, m.format,
           SUM(w.wickets) AS wickets,
           SUM(w.runs_conceded) AS runs_conceded,
           SUM(w.overs) AS overs
    FROM bowling_performance w
    JOIN matches m ON m.id = w.match_id
    GROUP BY w.player_id, m.format
),
appearances AS (
    SELECT player_id, format, COUNT(DISTINCT match_id) AS matches
    FROM (
        SELECT b.player_id, m.format, b.match_id
        FROM batting_performance b JOIN matches m ON m.id = b.match_id
        UNION
        SELECT w.player_id, m.format, w.match_id
        FROM bowling_performance w JOIN matches m ON m.id = w.match_id
    )
    GROUP BY player_id, format
)
SELECT a.player_id,
       a.format,
       a.matches AS total_matches,
       COALESCE(bat.innings, 0) AS total_innings,
       COALESCE(bat.runs, 0) AS total_runs,
       COALESCE(bat.balls, 0) AS balls_faced,
       bat.highest_score,
       COALESCE(bat.hundreds, 0) AS hundreds,
       COALESCE(bat.fifties, 0) AS fifties,
       CASE WHEN bat.dismissals > 0 THEN ROUND(1.0 * bat.runs / bat.dismissals, 2) END AS batting_average,
       CASE WHEN bat.balls > 0 THEN ROUND(bat.runs * 100.0 / bat.balls, 2) END AS strike_rate,
       COALESCE(bowl.wickets, 0) AS total_wickets,
       CASE WHEN bowl.wickets > 0 THEN ROUND(1.0 * bowl.runs_conceded / bowl.wickets, 2) END AS bowling_average,
       CASE WHEN bowl.overs > 0 THEN ROUND(bowl.runs_conceded / bowl.overs, 2) END AS economy_rate
FROM appearances a
LEFT JOIN bat ON bat.player_id = a.player_id AND bat.format = a.format
LEFT JOIN bowl ON bowl.player_id = a.player_id AND bowl.format = a.format;
"#;
