//! Tier 1: filters, ordering and simple group-by counts.

use cricstat_catalog::MatchFormat;
use rusqlite::Connection;

use super::table::sql_table;
use super::{format_order, QueryError, ResultTable};

/// Q1
pub(crate) fn players_by_country(
    conn: &Connection,
    country: &str,
    limit: u32,
) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT p.full_name      AS "Player",
                  p.playing_role   AS "Role",
                  p.batting_style  AS "Batting Style",
                  p.bowling_style  AS "Bowling Style",
                  t.name           AS "Team"
           FROM players p
           LEFT JOIN teams t ON t.id = p.team_id
           WHERE p.country = ?1 COLLATE NOCASE
           ORDER BY p.full_name
           LIMIT ?2"#,
        &[&country.trim(), &limit],
    )
}

/// Q2
pub(crate) fn recent_matches(conn: &Connection, limit: u32) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT m.match_date                     AS "Date",
                  m.format                         AS "Format",
                  s.name                           AS "Series",
                  t1.name                          AS "Team 1",
                  t2.name                          AS "Team 2",
                  v.name || ', ' || v.city         AS "Venue",
                  m.status                         AS "Status",
                  w.name                           AS "Winner"
           FROM matches m
           LEFT JOIN series s ON s.id = m.series_id
           LEFT JOIN teams t1 ON t1.id = m.team1_id
           LEFT JOIN teams t2 ON t2.id = m.team2_id
           LEFT JOIN venues v ON v.id = m.venue_id
           LEFT JOIN teams w ON w.id = m.winner_id
           ORDER BY m.match_date DESC, m.id DESC
           LIMIT ?1"#,
        &[&limit],
    )
}

/// Q3
pub(crate) fn top_run_scorers(
    conn: &Connection,
    format: MatchFormat,
    limit: u32,
) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT p.full_name        AS "Player",
                  p.country          AS "Country",
                  c.total_matches    AS "Matches",
                  c.total_innings    AS "Innings",
                  c.total_runs       AS "Runs",
                  c.highest_score    AS "Highest",
                  c.batting_average  AS "Average",
                  c.strike_rate      AS "Strike Rate",
                  c.hundreds         AS "100s",
                  c.fifties          AS "50s"
           FROM player_career_stats c
           JOIN players p ON p.id = c.player_id
           WHERE c.format = ?1 AND c.total_innings > 0
           ORDER BY c.total_runs DESC, p.full_name
           LIMIT ?2"#,
        &[&format.as_str(), &limit],
    )
}

/// Q4
pub(crate) fn large_venues(conn: &Connection, min_capacity: u32) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT name      AS "Venue",
                  city      AS "City",
                  country   AS "Country",
                  capacity  AS "Capacity"
           FROM venues
           WHERE capacity IS NOT NULL AND capacity > ?1
           ORDER BY capacity DESC, name"#,
        &[&min_capacity],
    )
}

/// Q5
pub(crate) fn team_wins(conn: &Connection) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT t.name        AS "Team",
                  t.country     AS "Country",
                  COUNT(m.id)   AS "Wins"
           FROM teams t
           LEFT JOIN matches m ON m.winner_id = t.id AND m.status = 'Completed'
           GROUP BY t.id
           ORDER BY COUNT(m.id) DESC, t.name"#,
        &[],
    )
}

/// Q6
pub(crate) fn players_by_role(conn: &Connection) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT playing_role  AS "Role",
                  COUNT(*)      AS "Players"
           FROM players
           GROUP BY playing_role
           ORDER BY COUNT(*) DESC, playing_role"#,
        &[],
    )
}

/// Q7. SQLite returns the row that produced `MAX()` for the bare columns.
pub(crate) fn highest_score_by_format(conn: &Connection) -> Result<ResultTable, QueryError> {
    let sql = format!(
        r#"SELECT m.format          AS "Format",
                  MAX(b.runs)       AS "Highest Score",
                  p.full_name       AS "Player",
                  m.match_date      AS "Date"
           FROM batting_performance b
           JOIN matches m ON m.id = b.match_id
           JOIN players p ON p.id = b.player_id
           GROUP BY m.format
           ORDER BY {}"#,
        format_order("m.format")
    );
    sql_table(conn, &sql, &[])
}

/// Q8
pub(crate) fn series_by_year(conn: &Connection, year: i32) -> Result<ResultTable, QueryError> {
    let year = format!("{year:04}");
    sql_table(
        conn,
        r#"SELECT name           AS "Series",
                  host_country   AS "Host",
                  match_type     AS "Type",
                  start_date     AS "Start",
                  end_date       AS "End",
                  total_matches  AS "Matches"
           FROM series
           WHERE strftime('%Y', start_date) = ?1
           ORDER BY start_date, name"#,
        &[&year],
    )
}
