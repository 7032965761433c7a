//! Tier 3: statistical and time-series queries.
//!
//! SQLite lacks a standard-deviation aggregate, so Q19 and Q25 fetch
//! pre-grouped rows and finish in Rust. Q23 has a window-function path and a
//! two-pass path that produce identical tables.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Months, NaiveDate};
use cricstat_catalog::{round2, MatchFormat};
use rusqlite::Connection;

use super::intermediate::PARTNERSHIP_JOIN;
use super::table::sql_table;
use super::{format_order, Cell, QueryError, ResultTable};

// ── Statistics ──────────────────────────────────────────────────────────────

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_stddev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// First day of the trailing window ending at `as_of`.
fn years_before(as_of: NaiveDate, years: u32) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

/// Recent-form category from a last-five-innings average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormBucket {
    Excellent,
    Good,
    Average,
    Poor,
}

impl FormBucket {
    pub fn from_average(avg: f64) -> Self {
        if avg >= 50.0 {
            Self::Excellent
        } else if avg >= 35.0 {
            Self::Good
        } else if avg >= 20.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Poor => "Poor",
        }
    }
}

impl fmt::Display for FormBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Career phase from quarterly average level and volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareerPhase {
    Ascending,
    Stable,
    Declining,
}

impl CareerPhase {
    pub fn classify(average: f64, volatility: f64) -> Self {
        if volatility < 10.0 {
            Self::Stable
        } else if average > 40.0 && volatility < 20.0 {
            Self::Ascending
        } else if average < 25.0 {
            Self::Declining
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "Ascending",
            Self::Stable => "Stable",
            Self::Declining => "Declining",
        }
    }
}

impl fmt::Display for CareerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Q17 / Q18 ───────────────────────────────────────────────────────────────

/// Q17. Only decided matches with a recorded toss count.
pub(crate) fn toss_advantage(
    conn: &Connection,
    format: Option<MatchFormat>,
) -> Result<ResultTable, QueryError> {
    let format = format.map(|f| f.as_str());
    sql_table(
        conn,
        r#"SELECT toss_decision                                              AS "Decision",
                  COUNT(*)                                                   AS "Tosses",
                  SUM(winner_id = toss_winner_id)                            AS "Toss Winner Won",
                  ROUND(100.0 * SUM(winner_id = toss_winner_id) / COUNT(*), 2) AS "Win %"
           FROM matches
           WHERE status = 'Completed'
             AND winner_id IS NOT NULL
             AND toss_winner_id IS NOT NULL
             AND toss_decision IS NOT NULL
             AND (?1 IS NULL OR format = ?1)
           GROUP BY toss_decision
           ORDER BY toss_decision"#,
        &[&format],
    )
}

/// Q18
pub(crate) fn economical_bowlers(
    conn: &Connection,
    min_matches: u32,
    min_avg_overs: f64,
    limit: u32,
) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT p.full_name                    AS "Bowler",
                  p.country                      AS "Country",
                  COUNT(DISTINCT w.match_id)     AS "Matches",
                  ROUND(AVG(w.overs), 2)         AS "Average Overs",
                  SUM(w.wickets)                 AS "Wickets",
                  ROUND(AVG(w.economy_rate), 2)  AS "Economy"
           FROM bowling_performance w
           JOIN matches m ON m.id = w.match_id
           JOIN players p ON p.id = w.player_id
           WHERE m.format IN ('ODI', 'T20I') AND w.overs > 0
           GROUP BY w.player_id
           HAVING COUNT(DISTINCT w.match_id) >= ?1 AND AVG(w.overs) >= ?2
           ORDER BY AVG(w.economy_rate), SUM(w.wickets) DESC, p.full_name
           LIMIT ?3"#,
        &[&min_matches, &min_avg_overs, &limit],
    )
}

// ── Q19 ─────────────────────────────────────────────────────────────────────

/// Q19. Innings scores per player, standard deviation computed here.
pub(crate) fn consistency(
    conn: &Connection,
    min_balls: u32,
    min_innings: u32,
    since: Option<NaiveDate>,
    limit: u32,
) -> Result<ResultTable, QueryError> {
    let mut stmt = conn.prepare(
        "SELECT b.player_id, p.full_name, b.runs
         FROM batting_performance b
         JOIN matches m ON m.id = b.match_id
         JOIN players p ON p.id = b.player_id
         WHERE b.balls_faced >= ?1 AND (?2 IS NULL OR m.match_date >= ?2)
         ORDER BY b.player_id",
    )?;
    let rows = stmt.query_map(rusqlite::params![min_balls, since], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut scores: BTreeMap<i64, (String, Vec<f64>)> = BTreeMap::new();
    for row in rows {
        let (player_id, name, runs) = row?;
        scores
            .entry(player_id)
            .or_insert_with(|| (name, Vec::new()))
            .1
            .push(runs as f64);
    }

    let mut ranked: Vec<(String, usize, f64, f64)> = scores
        .into_values()
        .filter(|(_, runs)| runs.len() >= min_innings as usize)
        .filter_map(|(name, runs)| {
            let avg = mean(&runs)?;
            let sd = population_stddev(&runs)?;
            Some((name, runs.len(), avg, sd))
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.3.total_cmp(&b.3)
            .then(b.2.total_cmp(&a.2))
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(limit as usize);

    let mut table = ResultTable::new(&["Player", "Innings", "Average Runs", "Std Dev"]);
    for (name, innings, avg, sd) in ranked {
        table.rows.push(vec![
            name.into(),
            Cell::Integer(innings as i64),
            round2(avg).into(),
            round2(sd).into(),
        ]);
    }
    Ok(table)
}

// ── Q20 / Q21 / Q22 ─────────────────────────────────────────────────────────

/// Q20
pub(crate) fn format_experience(
    conn: &Connection,
    min_matches: u32,
) -> Result<ResultTable, QueryError> {
    sql_table(
        conn,
        r#"SELECT p.full_name                                                          AS "Player",
                  SUM(c.total_matches)                                                 AS "Total Matches",
                  SUM(CASE WHEN c.format = 'Test' THEN c.total_matches ELSE 0 END)     AS "Test Matches",
                  MAX(CASE WHEN c.format = 'Test' THEN c.batting_average END)          AS "Test Average",
                  SUM(CASE WHEN c.format = 'ODI' THEN c.total_matches ELSE 0 END)      AS "ODI Matches",
                  MAX(CASE WHEN c.format = 'ODI' THEN c.batting_average END)           AS "ODI Average",
                  SUM(CASE WHEN c.format = 'T20I' THEN c.total_matches ELSE 0 END)     AS "T20I Matches",
                  MAX(CASE WHEN c.format = 'T20I' THEN c.batting_average END)          AS "T20I Average"
           FROM player_career_stats c
           JOIN players p ON p.id = c.player_id
           GROUP BY c.player_id
           HAVING SUM(c.total_matches) >= ?1
           ORDER BY SUM(c.total_matches) DESC, p.full_name"#,
        &[&min_matches],
    )
}

/// Q21. Batting points: `runs × 0.01 + average × 0.5 + strike rate × 0.3`.
/// Bowling points: `wickets × 2 + (50 − bowling average) × 0.5`, with an
/// undefined bowling average counted as 50.
pub(crate) fn performance_ranking(
    conn: &Connection,
    min_matches: u32,
) -> Result<ResultTable, QueryError> {
    let sql = format!(
        r#"WITH scored AS (
               SELECT c.player_id, c.format, c.total_matches,
                      c.total_runs * 0.01
                        + COALESCE(c.batting_average, 0) * 0.5
                        + COALESCE(c.strike_rate, 0) * 0.3 AS batting_points,
                      c.total_wickets * 2
                        + (50 - COALESCE(c.bowling_average, 50)) * 0.5 AS bowling_points
               FROM player_career_stats c
               WHERE c.total_matches >= ?1
           )
           SELECT p.full_name                                  AS "Player",
                  s.format                                     AS "Format",
                  s.total_matches                              AS "Matches",
                  ROUND(s.batting_points, 2)                   AS "Batting Points",
                  ROUND(s.bowling_points, 2)                   AS "Bowling Points",
                  ROUND(s.batting_points + s.bowling_points, 2) AS "Total Points"
           FROM scored s
           JOIN players p ON p.id = s.player_id
           ORDER BY {}, s.batting_points + s.bowling_points DESC, p.full_name"#,
        format_order("s.format")
    );
    sql_table(conn, &sql, &[&min_matches])
}

/// Q22. Pairs are unordered; `Team A` has the lower id.
pub(crate) fn head_to_head(
    conn: &Connection,
    as_of: NaiveDate,
    years: u32,
    min_matches: u32,
) -> Result<ResultTable, QueryError> {
    let start = years_before(as_of, years);
    sql_table(
        conn,
        r#"WITH decided AS (
               SELECT MIN(team1_id, team2_id) AS ta,
                      MAX(team1_id, team2_id) AS tb,
                      winner_id, victory_margin, victory_type
               FROM matches
               WHERE status = 'Completed'
                 AND winner_id IS NOT NULL
                 AND team1_id IS NOT NULL AND team2_id IS NOT NULL
                 AND match_date > ?1 AND match_date <= ?2
           )
           SELECT a.name                    AS "Team A",
                  b.name                    AS "Team B",
                  COUNT(*)                  AS "Matches",
                  SUM(d.winner_id = d.ta)   AS "Team A Wins",
                  SUM(d.winner_id = d.tb)   AS "Team B Wins",
                  ROUND(AVG(CASE WHEN d.victory_type = 'runs' THEN d.victory_margin END), 2)
                                            AS "Avg Margin (runs)",
                  ROUND(AVG(CASE WHEN d.victory_type = 'wickets' THEN d.victory_margin END), 2)
                                            AS "Avg Margin (wickets)"
           FROM decided d
           JOIN teams a ON a.id = d.ta
           JOIN teams b ON b.id = d.tb
           GROUP BY d.ta, d.tb
           HAVING COUNT(*) >= ?3
           ORDER BY COUNT(*) DESC, a.name, b.name"#,
        &[&start, &as_of, &min_matches],
    )
}

// ── Q23 ─────────────────────────────────────────────────────────────────────

/// Per-player totals over the most recent innings in the form window.
#[derive(Debug, Default)]
struct FormTotals {
    name: String,
    innings: u32,
    runs5: i64,
    count5: u32,
    runs10: i64,
    /// Sum of per-innings strike rates.
    strike10: f64,
    count10: u32,
    fifties10: u32,
}

impl FormTotals {
    /// Fold in one innings, newest first.
    fn push(&mut self, runs: i64, strike_rate: f64) {
        self.innings += 1;
        if self.count5 < 5 {
            self.runs5 += runs;
            self.count5 += 1;
        }
        if self.count10 < 10 {
            self.runs10 += runs;
            self.strike10 += strike_rate;
            self.count10 += 1;
            if runs >= 50 {
                self.fifties10 += 1;
            }
        }
    }
}

fn form_table(totals: Vec<FormTotals>, min_innings: u32) -> ResultTable {
    let mut rows: Vec<(FormTotals, f64, f64)> = totals
        .into_iter()
        .filter(|t| t.innings >= min_innings && t.count5 > 0)
        .map(|t| {
            let last5 = round2(t.runs5 as f64 / f64::from(t.count5));
            let last10 = round2(t.runs10 as f64 / f64::from(t.count10.max(1)));
            (t, last5, last10)
        })
        .collect();
    rows.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then(b.2.total_cmp(&a.2))
            .then_with(|| a.0.name.cmp(&b.0.name))
    });

    let mut table = ResultTable::new(&[
        "Player",
        "Innings",
        "Last 5 Avg",
        "Last 10 Avg",
        "Recent Strike Rate",
        "50+ Scores",
        "Form",
    ]);
    for (t, last5, last10) in rows {
        // Mean of the per-innings strike rates, not runs over balls.
        let strike = if t.count10 > 0 {
            round2(t.strike10 / f64::from(t.count10))
        } else {
            0.0
        };
        table.rows.push(vec![
            t.name.into(),
            t.innings.into(),
            last5.into(),
            last10.into(),
            strike.into(),
            t.fifties10.into(),
            FormBucket::from_average(last5).as_str().into(),
        ]);
    }
    table
}

/// Q23 with `ROW_NUMBER()`.
pub(crate) fn recent_form_sql(
    conn: &Connection,
    as_of: NaiveDate,
    min_innings: u32,
) -> Result<ResultTable, QueryError> {
    let start = years_before(as_of, 1);
    let mut stmt = conn.prepare(
        "WITH ranked AS (
             SELECT b.player_id, b.runs, b.strike_rate,
                    ROW_NUMBER() OVER (
                        PARTITION BY b.player_id
                        ORDER BY m.match_date DESC, m.id DESC, b.innings DESC
                    ) AS rn
             FROM batting_performance b
             JOIN matches m ON m.id = b.match_id
             WHERE m.match_date > ?1 AND m.match_date <= ?2
         )
         SELECT r.player_id, p.full_name,
                COUNT(*),
                SUM(CASE WHEN r.rn <= 5 THEN r.runs ELSE 0 END),
                SUM(r.rn <= 5),
                SUM(CASE WHEN r.rn <= 10 THEN r.runs ELSE 0 END),
                TOTAL(CASE WHEN r.rn <= 10 THEN r.strike_rate END),
                SUM(r.rn <= 10),
                SUM(r.rn <= 10 AND r.runs >= 50)
         FROM ranked r
         JOIN players p ON p.id = r.player_id
         GROUP BY r.player_id
         HAVING COUNT(*) >= ?3",
    )?;
    let totals = stmt
        .query_map(rusqlite::params![start, as_of, min_innings], |row| {
            Ok(FormTotals {
                name: row.get(1)?,
                innings: row.get(2)?,
                runs5: row.get(3)?,
                count5: row.get(4)?,
                runs10: row.get(5)?,
                strike10: row.get(6)?,
                count10: row.get(7)?,
                fifties10: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(form_table(totals, min_innings))
}

/// Q23 without window functions: fetch innings newest-first and count in Rust.
pub(crate) fn recent_form_two_pass(
    conn: &Connection,
    as_of: NaiveDate,
    min_innings: u32,
) -> Result<ResultTable, QueryError> {
    let start = years_before(as_of, 1);
    let mut stmt = conn.prepare(
        "SELECT b.player_id, p.full_name, b.runs, b.strike_rate
         FROM batting_performance b
         JOIN matches m ON m.id = b.match_id
         JOIN players p ON p.id = b.player_id
         WHERE m.match_date > ?1 AND m.match_date <= ?2
         ORDER BY b.player_id, m.match_date DESC, m.id DESC, b.innings DESC",
    )?;
    let mut rows = stmt.query(rusqlite::params![start, as_of])?;

    let mut by_player: BTreeMap<i64, FormTotals> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let player_id: i64 = row.get(0)?;
        let entry = match by_player.entry(player_id) {
            std::collections::btree_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::btree_map::Entry::Vacant(e) => e.insert(FormTotals {
                name: row.get(1)?,
                ..FormTotals::default()
            }),
        };
        entry.push(row.get(2)?, row.get(3)?);
    }
    Ok(form_table(by_player.into_values().collect(), min_innings))
}

// ── Q24 / Q25 ───────────────────────────────────────────────────────────────

/// Q24. Pairs are unordered; `Batsman 1` has the lower player id.
pub(crate) fn best_partnerships(
    conn: &Connection,
    success_runs: u32,
    min_partnerships: u32,
    limit: u32,
) -> Result<ResultTable, QueryError> {
    let sql = format!(
        r#"WITH pairs AS (
               SELECT MIN(a.player_id, b.player_id) AS p1,
                      MAX(a.player_id, b.player_id) AS p2,
                      a.runs + b.runs AS runs
               FROM {PARTNERSHIP_JOIN}
           )
           SELECT x.full_name                                          AS "Batsman 1",
                  y.full_name                                          AS "Batsman 2",
                  COUNT(*)                                             AS "Partnerships",
                  ROUND(AVG(pr.runs), 2)                               AS "Average",
                  SUM(pr.runs >= ?1)                                   AS "Successful",
                  MAX(pr.runs)                                         AS "Highest",
                  ROUND(100.0 * SUM(pr.runs >= ?1) / COUNT(*), 2)      AS "Success Rate %"
           FROM pairs pr
           JOIN players x ON x.id = pr.p1
           JOIN players y ON y.id = pr.p2
           GROUP BY pr.p1, pr.p2
           HAVING COUNT(*) >= ?2
           ORDER BY AVG(pr.runs) DESC, SUM(pr.runs >= ?1) DESC, x.full_name, y.full_name
           LIMIT ?3"#
    );
    sql_table(conn, &sql, &[&success_runs, &min_partnerships, &limit])
}

/// Q25. Quarterly averages come from SQL; level, volatility and phase are
/// computed here.
pub(crate) fn career_trajectory(
    conn: &Connection,
    as_of: NaiveDate,
    years: u32,
    min_quarter_matches: u32,
    min_quarters: u32,
) -> Result<ResultTable, QueryError> {
    let start = years_before(as_of, years);
    let mut stmt = conn.prepare(
        "SELECT b.player_id, p.full_name,
                CAST(strftime('%Y', m.match_date) AS INTEGER) AS yr,
                (CAST(strftime('%m', m.match_date) AS INTEGER) + 2) / 3 AS qtr,
                SUM(b.runs), COUNT(*)
         FROM batting_performance b
         JOIN matches m ON m.id = b.match_id
         JOIN players p ON p.id = b.player_id
         WHERE m.match_date > ?1 AND m.match_date <= ?2
         GROUP BY b.player_id, yr, qtr
         HAVING COUNT(DISTINCT m.id) >= ?3
         ORDER BY b.player_id, yr, qtr",
    )?;
    let rows = stmt.query_map(
        rusqlite::params![start, as_of, min_quarter_matches],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        },
    )?;

    let mut quarters: BTreeMap<i64, (String, Vec<f64>)> = BTreeMap::new();
    for row in rows {
        let (player_id, name, runs, innings) = row?;
        if innings > 0 {
            quarters
                .entry(player_id)
                .or_insert_with(|| (name, Vec::new()))
                .1
                .push(round2(runs as f64 / innings as f64));
        }
    }

    let mut out: Vec<(String, usize, f64, f64, f64, f64, CareerPhase)> = Vec::new();
    for (name, avgs) in quarters.into_values() {
        if avgs.len() < min_quarters as usize {
            continue;
        }
        let (Some(level), Some(vol), Some(first), Some(last)) = (
            mean(&avgs),
            population_stddev(&avgs),
            avgs.first().copied(),
            avgs.last().copied(),
        ) else {
            continue;
        };
        // Classify on the unrounded figures; rounding only applies to display.
        out.push((
            name,
            avgs.len(),
            level,
            vol,
            first,
            last,
            CareerPhase::classify(level, vol),
        ));
    }
    out.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    let mut table = ResultTable::new(&[
        "Player",
        "Quarters",
        "Average",
        "Volatility",
        "First Quarter Avg",
        "Last Quarter Avg",
        "Phase",
    ]);
    for (name, count, level, vol, first, last, phase) in out {
        table.rows.push(vec![
            name.into(),
            Cell::Integer(count as i64),
            round2(level).into(),
            round2(vol).into(),
            first.into(),
            last.into(),
            phase.as_str().into(),
        ]);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_is_population() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(population_stddev(&values), Some(2.0));
        assert_eq!(population_stddev(&[]), None);
        assert_eq!(population_stddev(&[42.0]), Some(0.0));
    }

    #[test]
    fn form_buckets() {
        assert_eq!(FormBucket::from_average(50.0), FormBucket::Excellent);
        assert_eq!(FormBucket::from_average(49.99), FormBucket::Good);
        assert_eq!(FormBucket::from_average(35.0), FormBucket::Good);
        assert_eq!(FormBucket::from_average(20.0), FormBucket::Average);
        assert_eq!(FormBucket::from_average(19.5), FormBucket::Poor);
    }

    #[test]
    fn career_phases() {
        assert_eq!(CareerPhase::classify(60.0, 5.0), CareerPhase::Stable);
        assert_eq!(CareerPhase::classify(45.0, 15.0), CareerPhase::Ascending);
        assert_eq!(CareerPhase::classify(20.0, 15.0), CareerPhase::Declining);
        assert_eq!(CareerPhase::classify(30.0, 15.0), CareerPhase::Stable);
        assert_eq!(CareerPhase::classify(45.0, 25.0), CareerPhase::Stable);
        assert_eq!(CareerPhase::classify(10.0, 25.0), CareerPhase::Declining);
    }

    #[test]
    fn window_start_handles_leap_day() {
        let as_of = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            years_before(as_of, 1),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }
}
