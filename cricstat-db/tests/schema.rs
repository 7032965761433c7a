use cricstat_db::schema::{
    create_schema, get_schema_version, migrate, open_database, SchemaError, CURRENT_VERSION,
};
use cricstat_db::{open_memory, DatabaseConfig};

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    // Creating again should not error
    create_schema(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let tables = [
        "schema_version",
        "teams",
        "venues",
        "players",
        "series",
        "matches",
        "batting_performance",
        "bowling_performance",
        "ingest_log",
    ];
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table '{}' should exist", table);
    }

    let view: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='view' AND name='player_career_stats')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(view);
}

#[test]
fn check_constraints_reject_bad_rows() {
    let conn = open_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO teams (id, name, country) VALUES (1, 'India', 'India'), (2, 'Australia', 'Australia');",
    )
    .unwrap();

    // Same team on both sides.
    assert!(conn
        .execute(
            "INSERT INTO matches (team1_id, team2_id, match_date, format) VALUES (1, 1, '2024-01-01', 'ODI')",
            [],
        )
        .is_err());

    // Unknown format.
    assert!(conn
        .execute(
            "INSERT INTO matches (team1_id, team2_id, match_date, format) VALUES (1, 2, '2024-01-01', 'T10')",
            [],
        )
        .is_err());

    // Margin without a type.
    assert!(conn
        .execute(
            "INSERT INTO matches (team1_id, team2_id, match_date, format, victory_margin)
             VALUES (1, 2, '2024-01-01', 'ODI', 12)",
            [],
        )
        .is_err());
}

#[test]
fn generated_rates_follow_raw_counts() {
    let conn = open_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO teams (id, name, country) VALUES (1, 'India', 'India'), (2, 'Australia', 'Australia');
         INSERT INTO players (id, full_name, country, playing_role) VALUES (1, 'A Batter', 'India', 'Batsman');
         INSERT INTO matches (id, team1_id, team2_id, match_date, format) VALUES (1, 1, 2, '2024-01-01', 'ODI');
         INSERT INTO batting_performance (match_id, player_id, innings, batting_position, runs, balls_faced)
             VALUES (1, 1, 1, 1, 45, 38);
         INSERT INTO bowling_performance (match_id, player_id, innings, overs, runs_conceded, wickets)
             VALUES (1, 1, 2, 3.0, 20, 1);",
    )
    .unwrap();

    let sr: f64 = conn
        .query_row("SELECT strike_rate FROM batting_performance", [], |r| r.get(0))
        .unwrap();
    assert_eq!(sr, 118.42);

    conn.execute("UPDATE batting_performance SET balls_faced = 0", [])
        .unwrap();
    let sr: f64 = conn
        .query_row("SELECT strike_rate FROM batting_performance", [], |r| r.get(0))
        .unwrap();
    assert_eq!(sr, 0.0);

    let econ: f64 = conn
        .query_row("SELECT economy_rate FROM bowling_performance", [], |r| r.get(0))
        .unwrap();
    assert_eq!(econ, 6.67);
}

#[test]
fn file_database_is_created_and_reopened() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig::new(dir.path().join("nested").join("cricket.db"));

    {
        let conn = open_database(&config).unwrap();
        conn.execute(
            "INSERT INTO teams (name, country) VALUES ('India', 'India')",
            [],
        )
        .unwrap();
    }

    let conn = open_database(&config).unwrap();
    let teams: i64 = conn
        .query_row("SELECT COUNT(*) FROM teams", [], |r| r.get(0))
        .unwrap();
    assert_eq!(teams, 1);
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn migrate_from_v1_adds_ingest_log() {
    let conn = open_memory().unwrap();
    conn.execute_batch(
        "DROP TABLE ingest_log;
         DELETE FROM schema_version;
         INSERT INTO schema_version (version) VALUES (1);",
    )
    .unwrap();

    migrate(&conn, 1).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='ingest_log')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(exists);
}

#[test]
fn newer_database_is_rejected() {
    let conn = open_memory().unwrap();
    let err = migrate(&conn, CURRENT_VERSION + 1).unwrap_err();
    assert!(matches!(err, SchemaError::VersionMismatch { .. }));
}
