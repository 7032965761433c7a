//! Tier 2: joins, pivots and derived groupings.

use rusqlite::Connection;

use super::table::sql_table;
use super::{format_order, QueryError, ResultTable};

/// Adjacent batting positions within one innings. `a` batted directly
/// before `b`.
pub(crate) const PARTNERSHIP_JOIN: &str = "batting_performance a
           JOIN batting_performance b
             ON b.match_id = a.match_id
            AND b.innings = a.innings
            AND b.batting_position = a.batting_position + 1";

/// Q9
pub(crate) fn all_rounders(
    conn: &Connection,
    min_runs: u32,
    min_wickets: u32,
) -> Result<ResultTable, QueryError> {
    let sql = format!(
        r#"SELECT p.full_name        AS "Player",
                  p.country          AS "Country",
                  c.format           AS "Format",
                  c.total_matches    AS "Matches",
                  c.total_runs       AS "Runs",
                  c.total_wickets    AS "Wickets",
                  c.batting_average  AS "Batting Average",
                  c.bowling_average  AS "Bowling Average"
           FROM player_career_stats c
           JOIN players p ON p.id = c.player_id
           WHERE c.total_runs >= ?1 AND c.total_wickets >= ?2
           ORDER BY {}, c.total_runs DESC, p.full_name"#,
        format_order("c.format")
    );
    sql_table(conn, &sql, &[&min_runs, &min_wickets])
}

/// Q10
pub(crate) fn recent_results(conn: &Connection, limit: u32) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT m.match_date              AS "Date",
                  m.format                  AS "Format",
                  m.description             AS "Match",
                  t1.name                   AS "Team 1",
                  t2.name                   AS "Team 2",
                  w.name                    AS "Winner",
                  m.victory_margin          AS "Margin",
                  m.victory_type            AS "Type",
                  v.name || ', ' || v.city  AS "Venue"
           FROM matches m
           LEFT JOIN teams t1 ON t1.id = m.team1_id
           LEFT JOIN teams t2 ON t2.id = m.team2_id
           LEFT JOIN teams w ON w.id = m.winner_id
           LEFT JOIN venues v ON v.id = m.venue_id
           WHERE m.status = 'Completed'
           ORDER BY m.match_date DESC, m.id DESC
           LIMIT ?1"#,
        &[&limit],
    )
}

/// Q11
pub(crate) fn format_comparison(
    conn: &Connection,
    min_formats: u32,
) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT p.full_name                                               AS "Player",
                  SUM(CASE WHEN m.format = 'Test' THEN b.runs ELSE 0 END)   AS "Test Runs",
                  SUM(CASE WHEN m.format = 'ODI'  THEN b.runs ELSE 0 END)   AS "ODI Runs",
                  SUM(CASE WHEN m.format = 'T20I' THEN b.runs ELSE 0 END)   AS "T20I Runs",
                  SUM(b.runs)                                               AS "Total Runs",
                  ROUND(1.0 * SUM(b.runs) / NULLIF(SUM(b.dismissed), 0), 2) AS "Overall Average",
                  COUNT(DISTINCT m.format)                                  AS "Formats"
           FROM batting_performance b
           JOIN matches m ON m.id = b.match_id
           JOIN players p ON p.id = b.player_id
           GROUP BY p.id
           HAVING COUNT(DISTINCT m.format) >= ?1
           ORDER BY SUM(b.runs) DESC, p.full_name"#,
        &[&min_formats],
    )
}

/// Q12. A match is at home when the venue's country equals the team's.
pub(crate) fn home_away(conn: &Connection) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"WITH played AS (
               SELECT t.id AS team_id,
                      (v.country = t.country COLLATE NOCASE) AS home,
                      (m.winner_id = t.id) AS won
               FROM matches m
               JOIN venues v ON v.id = m.venue_id
               JOIN teams t ON t.id IN (m.team1_id, m.team2_id)
               WHERE m.status = 'Completed'
           )
           SELECT t.name                                AS "Team",
                  SUM(pl.home)                          AS "Home Matches",
                  SUM(pl.home AND pl.won)               AS "Home Wins",
                  SUM(NOT pl.home)                      AS "Away Matches",
                  SUM(NOT pl.home AND pl.won)           AS "Away Wins",
                  ROUND(100.0 * SUM(pl.home AND pl.won) / NULLIF(SUM(pl.home), 0), 2)
                                                        AS "Home Win %",
                  ROUND(100.0 * SUM(NOT pl.home AND pl.won) / NULLIF(SUM(NOT pl.home), 0), 2)
                                                        AS "Away Win %"
           FROM played pl
           JOIN teams t ON t.id = pl.team_id
           GROUP BY t.id
           ORDER BY SUM(COALESCE(pl.won, 0)) DESC, t.name"#,
        &[],
    )
}

/// Q13
pub(crate) fn partnerships(conn: &Connection, threshold: u32) -> Result<ResultTable, QueryError> {
    let sql = format!(
        r#"SELECT m.match_date                AS "Date",
                  m.description               AS "Match",
                  a.innings                   AS "Innings",
                  pa.full_name                AS "Batsman 1",
                  pb.full_name                AS "Batsman 2",
                  a.batting_position          AS "Position 1",
                  b.batting_position          AS "Position 2",
                  a.runs + b.runs             AS "Partnership Runs"
           FROM {PARTNERSHIP_JOIN}
           JOIN matches m ON m.id = a.match_id
           JOIN players pa ON pa.id = a.player_id
           JOIN players pb ON pb.id = b.player_id
           WHERE a.runs + b.runs >= ?1
           ORDER BY a.runs + b.runs DESC, m.match_date DESC, a.batting_position"#
    );
    sql_table(conn, &sql, &[&threshold])
}

/// Q14
pub(crate) fn bowling_by_venue(
    conn: &Connection,
    min_overs: f64,
    min_matches: u32,
) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT p.full_name                    AS "Bowler",
                  v.name                         AS "Venue",
                  COUNT(DISTINCT w.match_id)     AS "Matches",
                  SUM(w.wickets)                 AS "Wickets",
                  ROUND(SUM(w.overs), 1)         AS "Overs",
                  ROUND(AVG(w.economy_rate), 2)  AS "Average Economy"
           FROM bowling_performance w
           JOIN matches m ON m.id = w.match_id
           JOIN venues v ON v.id = m.venue_id
           JOIN players p ON p.id = w.player_id
           WHERE w.overs >= ?1
           GROUP BY w.player_id, v.id
           HAVING COUNT(DISTINCT w.match_id) >= ?2
           ORDER BY AVG(w.economy_rate), SUM(w.wickets) DESC, p.full_name"#,
        &[&min_overs, &min_matches],
    )
}

/// Q15. A close match was won by fewer than `max_runs` runs or
/// `max_wickets` wickets.
pub(crate) fn close_matches(
    conn: &Connection,
    max_runs: u32,
    max_wickets: u32,
    min_matches: u32,
) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"WITH close_games AS (
               SELECT id, winner_id
               FROM matches
               WHERE status = 'Completed'
                 AND ((victory_type = 'runs' AND victory_margin < ?1)
                   OR (victory_type = 'wickets' AND victory_margin < ?2))
           )
           SELECT p.full_name                                     AS "Player",
                  COUNT(DISTINCT c.id)                            AS "Close Matches",
                  COUNT(*)                                        AS "Innings",
                  SUM(b.runs)                                     AS "Runs",
                  ROUND(AVG(b.runs), 2)                           AS "Average Runs",
                  COUNT(DISTINCT CASE WHEN c.winner_id = p.team_id THEN c.id END)
                                                                  AS "Team Won"
           FROM batting_performance b
           JOIN close_games c ON c.id = b.match_id
           JOIN players p ON p.id = b.player_id
           GROUP BY p.id
           HAVING COUNT(DISTINCT c.id) >= ?3
           ORDER BY AVG(b.runs) DESC, p.full_name"#,
        &[&max_runs, &max_wickets, &min_matches],
    )
}

/// Q16
pub(crate) fn yearly_trend(
    conn: &Connection,
    from_year: i32,
    min_matches: u32,
) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT p.full_name                                                     AS "Player",
                  CAST(strftime('%Y', m.match_date) AS INTEGER)                   AS "Year",
                  COUNT(DISTINCT m.id)                                            AS "Matches",
                  SUM(b.runs)                                                     AS "Runs",
                  ROUND(AVG(b.runs), 2)                                           AS "Average Runs",
                  ROUND(SUM(b.runs) * 100.0 / NULLIF(SUM(b.balls_faced), 0), 2)   AS "Strike Rate"
           FROM batting_performance b
           JOIN matches m ON m.id = b.match_id
           JOIN players p ON p.id = b.player_id
           WHERE CAST(strftime('%Y', m.match_date) AS INTEGER) >= ?1
           GROUP BY p.id, strftime('%Y', m.match_date)
           HAVING COUNT(DISTINCT m.id) >= ?2
           ORDER BY p.full_name, 2"#,
        &[&from_year, &min_matches],
    )
}
