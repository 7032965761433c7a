//! The analytical query catalog.
//!
//! Twenty-five read-only queries, addressable as `Q1`..`Q25`, grouped into
//! three tiers. Each query carries its own typed parameters ([`Query`]) and is
//! validated before it runs. Time-relative queries take an explicit `as_of`
//! date so results do not depend on the wall clock.
//!
//! SQLite has no standard-deviation aggregate, so the consistency and
//! trajectory queries pre-aggregate in SQL and finish in Rust. The recent-form
//! query can run either with window functions or as a two-pass computation;
//! see [`Strategy`].

mod advanced;
mod basic;
mod intermediate;
mod table;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use cricstat_catalog::MatchFormat;
use rusqlite::Connection;
use thiserror::Error;

use crate::schema::{sqlite_version, SchemaError};

pub use advanced::{population_stddev, CareerPhase, FormBucket};
pub use table::{Cell, Record, ResultTable};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Unknown query '{0}' (expected Q1..Q25)")]
    UnknownQuery(String),
    #[error("{query}: invalid {name}: {message}")]
    InvalidParameter {
        query: QueryId,
        name: &'static str,
        message: String,
    },
    #[error("{query} does not take a {name} parameter")]
    UnsupportedParameter { query: QueryId, name: &'static str },
    #[error("{query} requires window functions, which this SQLite build lacks")]
    WindowFunctionsUnavailable { query: QueryId },
}

// ── Catalog ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Basic,
    Intermediate,
    Advanced,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        })
    }
}

/// Stable identifier of a catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryId {
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
    Q6,
    Q7,
    Q8,
    Q9,
    Q10,
    Q11,
    Q12,
    Q13,
    Q14,
    Q15,
    Q16,
    Q17,
    Q18,
    Q19,
    Q20,
    Q21,
    Q22,
    Q23,
    Q24,
    Q25,
}

impl QueryId {
    pub const ALL: [QueryId; 25] = [
        Self::Q1,
        Self::Q2,
        Self::Q3,
        Self::Q4,
        Self::Q5,
        Self::Q6,
        Self::Q7,
        Self::Q8,
        Self::Q9,
        Self::Q10,
        Self::Q11,
        Self::Q12,
        Self::Q13,
        Self::Q14,
        Self::Q15,
        Self::Q16,
        Self::Q17,
        Self::Q18,
        Self::Q19,
        Self::Q20,
        Self::Q21,
        Self::Q22,
        Self::Q23,
        Self::Q24,
        Self::Q25,
    ];

    /// 1-based position in the catalog.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    pub fn tier(&self) -> Tier {
        match self.number() {
            1..=8 => Tier::Basic,
            9..=16 => Tier::Intermediate,
            _ => Tier::Advanced,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Q1 => "Players by Country",
            Self::Q2 => "Recent Matches",
            Self::Q3 => "Top Run Scorers",
            Self::Q4 => "Large Venues",
            Self::Q5 => "Team Wins",
            Self::Q6 => "Players by Role",
            Self::Q7 => "Highest Score by Format",
            Self::Q8 => "Series by Start Year",
            Self::Q9 => "All-rounders",
            Self::Q10 => "Recent Results",
            Self::Q11 => "Format Comparison",
            Self::Q12 => "Home vs Away",
            Self::Q13 => "Batting Partnerships",
            Self::Q14 => "Bowling by Venue",
            Self::Q15 => "Close-match Performers",
            Self::Q16 => "Yearly Batting Trend",
            Self::Q17 => "Toss Advantage",
            Self::Q18 => "Economical Bowlers",
            Self::Q19 => "Consistent Batsmen",
            Self::Q20 => "Format-wise Experience",
            Self::Q21 => "Performance Ranking",
            Self::Q22 => "Head to Head",
            Self::Q23 => "Recent Form",
            Self::Q24 => "Best Partnerships",
            Self::Q25 => "Career Trajectory",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Q1 => "Players who represent a country, with role, styles and team.",
            Self::Q2 => "Most recent matches with series, teams, venue, status and winner.",
            Self::Q3 => "Highest career run scorers in a format.",
            Self::Q4 => "Venues whose seating capacity exceeds a threshold.",
            Self::Q5 => "Number of matches won by each team.",
            Self::Q6 => "Number of players in each playing role.",
            Self::Q7 => "Highest individual innings in each format and who made it.",
            Self::Q8 => "Series that started in a given year.",
            Self::Q9 => "All-rounders past run and wicket milestones in a format.",
            Self::Q10 => "Latest completed matches with winner, margin and venue.",
            Self::Q11 => "Career runs side by side per format, for multi-format players.",
            Self::Q12 => "Wins at home (venue in the team's country) versus away.",
            Self::Q13 => "Adjacent-position batting pairs whose combined runs reach a threshold.",
            Self::Q14 => "Bowling economy and wickets per bowler and venue.",
            Self::Q15 => "Batting in matches decided by under 50 runs or 5 wickets.",
            Self::Q16 => "Average runs and strike rate per player per year.",
            Self::Q17 => "How often the toss winner wins, by toss decision.",
            Self::Q18 => "Lowest economy rates in limited-overs cricket.",
            Self::Q19 => "Batsmen ranked by standard deviation of runs (lower is steadier).",
            Self::Q20 => "Matches and batting average per format for experienced players.",
            Self::Q21 => "Weighted batting and bowling points per player and format.",
            Self::Q22 => "Wins between each pair of teams over a trailing window.",
            Self::Q23 => "Last-5 versus last-10 innings form, bucketed Excellent to Poor.",
            Self::Q24 => "Batting pairs ranked by average partnership and success rate.",
            Self::Q25 => "Quarterly run averages, volatility and career phase.",
        }
    }

    /// Parse `Q13`, `q13` or `13`.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);
        digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| QueryError::UnknownQuery(text.to_string()))
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

impl FromStr for QueryId {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── Parameters ──────────────────────────────────────────────────────────────

/// A catalog query together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Q1
    PlayersByCountry { country: String, limit: u32 },
    /// Q2
    RecentMatches { limit: u32 },
    /// Q3
    TopRunScorers { format: MatchFormat, limit: u32 },
    /// Q4
    LargeVenues { min_capacity: u32 },
    /// Q5
    TeamWins,
    /// Q6
    PlayersByRole,
    /// Q7
    HighestScoreByFormat,
    /// Q8
    SeriesByYear { year: i32 },
    /// Q9
    AllRounders { min_runs: u32, min_wickets: u32 },
    /// Q10
    RecentResults { limit: u32 },
    /// Q11
    FormatComparison { min_formats: u32 },
    /// Q12
    HomeAway,
    /// Q13
    Partnerships { threshold: u32 },
    /// Q14
    BowlingByVenue { min_overs: f64, min_matches: u32 },
    /// Q15
    CloseMatches {
        max_runs: u32,
        max_wickets: u32,
        min_matches: u32,
    },
    /// Q16
    YearlyTrend { from_year: i32, min_matches: u32 },
    /// Q17
    TossAdvantage { format: Option<MatchFormat> },
    /// Q18
    EconomicalBowlers {
        min_matches: u32,
        min_avg_overs: f64,
        limit: u32,
    },
    /// Q19
    Consistency {
        min_balls: u32,
        min_innings: u32,
        since: Option<NaiveDate>,
        limit: u32,
    },
    /// Q20
    FormatExperience { min_matches: u32 },
    /// Q21
    PerformanceRanking { min_matches: u32 },
    /// Q22
    HeadToHead {
        as_of: NaiveDate,
        years: u32,
        min_matches: u32,
    },
    /// Q23
    RecentForm { as_of: NaiveDate, min_innings: u32 },
    /// Q24
    BestPartnerships {
        success_runs: u32,
        min_partnerships: u32,
        limit: u32,
    },
    /// Q25
    CareerTrajectory {
        as_of: NaiveDate,
        years: u32,
        min_quarter_matches: u32,
        min_quarters: u32,
    },
}

impl Query {
    /// The query with its default parameters. `as_of` anchors the trailing
    /// windows of Q22, Q23 and Q25.
    pub fn defaults(id: QueryId, as_of: NaiveDate) -> Self {
        match id {
            QueryId::Q1 => Self::PlayersByCountry {
                country: "India".to_string(),
                limit: 10,
            },
            QueryId::Q2 => Self::RecentMatches { limit: 10 },
            QueryId::Q3 => Self::TopRunScorers {
                format: MatchFormat::Odi,
                limit: 10,
            },
            QueryId::Q4 => Self::LargeVenues {
                min_capacity: 50_000,
            },
            QueryId::Q5 => Self::TeamWins,
            QueryId::Q6 => Self::PlayersByRole,
            QueryId::Q7 => Self::HighestScoreByFormat,
            QueryId::Q8 => Self::SeriesByYear { year: 2024 },
            QueryId::Q9 => Self::AllRounders {
                min_runs: 1000,
                min_wickets: 50,
            },
            QueryId::Q10 => Self::RecentResults { limit: 20 },
            QueryId::Q11 => Self::FormatComparison { min_formats: 2 },
            QueryId::Q12 => Self::HomeAway,
            QueryId::Q13 => Self::Partnerships { threshold: 100 },
            QueryId::Q14 => Self::BowlingByVenue {
                min_overs: 4.0,
                min_matches: 3,
            },
            QueryId::Q15 => Self::CloseMatches {
                max_runs: 50,
                max_wickets: 5,
                min_matches: 5,
            },
            QueryId::Q16 => Self::YearlyTrend {
                from_year: 2020,
                min_matches: 5,
            },
            QueryId::Q17 => Self::TossAdvantage { format: None },
            QueryId::Q18 => Self::EconomicalBowlers {
                min_matches: 10,
                min_avg_overs: 2.0,
                limit: 20,
            },
            QueryId::Q19 => Self::Consistency {
                min_balls: 10,
                min_innings: 15,
                since: NaiveDate::from_ymd_opt(2022, 1, 1),
                limit: 20,
            },
            QueryId::Q20 => Self::FormatExperience { min_matches: 20 },
            QueryId::Q21 => Self::PerformanceRanking { min_matches: 10 },
            QueryId::Q22 => Self::HeadToHead {
                as_of,
                years: 3,
                min_matches: 5,
            },
            QueryId::Q23 => Self::RecentForm {
                as_of,
                min_innings: 10,
            },
            QueryId::Q24 => Self::BestPartnerships {
                success_runs: 50,
                min_partnerships: 5,
                limit: 20,
            },
            QueryId::Q25 => Self::CareerTrajectory {
                as_of,
                years: 3,
                min_quarter_matches: 3,
                min_quarters: 6,
            },
        }
    }

    pub fn id(&self) -> QueryId {
        match self {
            Self::PlayersByCountry { .. } => QueryId::Q1,
            Self::RecentMatches { .. } => QueryId::Q2,
            Self::TopRunScorers { .. } => QueryId::Q3,
            Self::LargeVenues { .. } => QueryId::Q4,
            Self::TeamWins => QueryId::Q5,
            Self::PlayersByRole => QueryId::Q6,
            Self::HighestScoreByFormat => QueryId::Q7,
            Self::SeriesByYear { .. } => QueryId::Q8,
            Self::AllRounders { .. } => QueryId::Q9,
            Self::RecentResults { .. } => QueryId::Q10,
            Self::FormatComparison { .. } => QueryId::Q11,
            Self::HomeAway => QueryId::Q12,
            Self::Partnerships { .. } => QueryId::Q13,
            Self::BowlingByVenue { .. } => QueryId::Q14,
            Self::CloseMatches { .. } => QueryId::Q15,
            Self::YearlyTrend { .. } => QueryId::Q16,
            Self::TossAdvantage { .. } => QueryId::Q17,
            Self::EconomicalBowlers { .. } => QueryId::Q18,
            Self::Consistency { .. } => QueryId::Q19,
            Self::FormatExperience { .. } => QueryId::Q20,
            Self::PerformanceRanking { .. } => QueryId::Q21,
            Self::HeadToHead { .. } => QueryId::Q22,
            Self::RecentForm { .. } => QueryId::Q23,
            Self::BestPartnerships { .. } => QueryId::Q24,
            Self::CareerTrajectory { .. } => QueryId::Q25,
        }
    }

    /// Apply user-supplied overrides. An override the query has no slot for
    /// is an error rather than silently ignored.
    pub fn with_overrides(mut self, o: &QueryOverrides) -> Result<Self, QueryError> {
        let id = self.id();
        let unsupported = |name| QueryError::UnsupportedParameter { query: id, name };

        if let Some(c) = &o.country {
            match &mut self {
                Self::PlayersByCountry { country, .. } => *country = c.clone(),
                _ => return Err(unsupported("country")),
            }
        }
        if let Some(f) = o.format {
            match &mut self {
                Self::TopRunScorers { format, .. } => *format = f,
                Self::TossAdvantage { format } => *format = Some(f),
                _ => return Err(unsupported("format")),
            }
        }
        if let Some(y) = o.year {
            match &mut self {
                Self::SeriesByYear { year } => *year = y,
                Self::YearlyTrend { from_year, .. } => *from_year = y,
                Self::Consistency { since, .. } => *since = NaiveDate::from_ymd_opt(y, 1, 1),
                _ => return Err(unsupported("year")),
            }
        }
        if let Some(t) = o.threshold {
            match &mut self {
                Self::LargeVenues { min_capacity } => *min_capacity = t,
                Self::AllRounders { min_runs, .. } => *min_runs = t,
                Self::Partnerships { threshold } => *threshold = t,
                Self::CloseMatches { max_runs, .. } => *max_runs = t,
                Self::Consistency { min_balls, .. } => *min_balls = t,
                Self::BestPartnerships { success_runs, .. } => *success_runs = t,
                _ => return Err(unsupported("threshold")),
            }
        }
        if let Some(m) = o.min_matches {
            match &mut self {
                Self::FormatComparison { min_formats } => *min_formats = m,
                Self::BowlingByVenue { min_matches, .. }
                | Self::CloseMatches { min_matches, .. }
                | Self::YearlyTrend { min_matches, .. }
                | Self::EconomicalBowlers { min_matches, .. }
                | Self::FormatExperience { min_matches }
                | Self::PerformanceRanking { min_matches }
                | Self::HeadToHead { min_matches, .. } => *min_matches = m,
                Self::Consistency { min_innings, .. } | Self::RecentForm { min_innings, .. } => {
                    *min_innings = m
                }
                Self::BestPartnerships {
                    min_partnerships, ..
                } => *min_partnerships = m,
                Self::CareerTrajectory { min_quarters, .. } => *min_quarters = m,
                _ => return Err(unsupported("min_matches")),
            }
        }
        if let Some(l) = o.limit {
            match &mut self {
                Self::PlayersByCountry { limit, .. }
                | Self::RecentMatches { limit }
                | Self::TopRunScorers { limit, .. }
                | Self::RecentResults { limit }
                | Self::EconomicalBowlers { limit, .. }
                | Self::Consistency { limit, .. }
                | Self::BestPartnerships { limit, .. } => *limit = l,
                _ => return Err(unsupported("limit")),
            }
        }
        if let Some(d) = o.as_of {
            match &mut self {
                Self::HeadToHead { as_of, .. }
                | Self::RecentForm { as_of, .. }
                | Self::CareerTrajectory { as_of, .. } => *as_of = d,
                _ => return Err(unsupported("as_of")),
            }
        }
        Ok(self)
    }

    /// Check parameter ranges before execution.
    pub fn validate(&self) -> Result<(), QueryError> {
        let id = self.id();
        let invalid = |name: &'static str, message: &str| QueryError::InvalidParameter {
            query: id,
            name,
            message: message.to_string(),
        };
        let positive = |name: &'static str, value: u32| {
            if value == 0 {
                Err(invalid(name, "must be at least 1"))
            } else {
                Ok(())
            }
        };

        match self {
            Self::PlayersByCountry { country, limit } => {
                if country.trim().is_empty() {
                    return Err(invalid("country", "must not be empty"));
                }
                positive("limit", *limit)?;
            }
            Self::RecentMatches { limit }
            | Self::TopRunScorers { limit, .. }
            | Self::RecentResults { limit } => positive("limit", *limit)?,
            Self::SeriesByYear { year } | Self::YearlyTrend { from_year: year, .. } => {
                if !(1877..=9999).contains(year) {
                    return Err(invalid("year", "must be between 1877 and 9999"));
                }
            }
            Self::FormatComparison { min_formats } => {
                if !(1..=3).contains(min_formats) {
                    return Err(invalid("min_formats", "must be between 1 and 3"));
                }
            }
            Self::Partnerships { threshold } => positive("threshold", *threshold)?,
            Self::BowlingByVenue { min_overs, min_matches } => {
                if !min_overs.is_finite() || *min_overs < 0.0 {
                    return Err(invalid("min_overs", "must be a non-negative number"));
                }
                positive("min_matches", *min_matches)?;
            }
            Self::CloseMatches {
                max_runs,
                max_wickets,
                min_matches,
            } => {
                positive("max_runs", *max_runs)?;
                if !(1..=10).contains(max_wickets) {
                    return Err(invalid("max_wickets", "must be between 1 and 10"));
                }
                positive("min_matches", *min_matches)?;
            }
            Self::EconomicalBowlers {
                min_matches,
                min_avg_overs,
                limit,
            } => {
                positive("min_matches", *min_matches)?;
                if !min_avg_overs.is_finite() || *min_avg_overs < 0.0 {
                    return Err(invalid("min_avg_overs", "must be a non-negative number"));
                }
                positive("limit", *limit)?;
            }
            Self::Consistency {
                min_innings, limit, ..
            } => {
                if *min_innings < 2 {
                    return Err(invalid("min_innings", "must be at least 2"));
                }
                positive("limit", *limit)?;
            }
            Self::HeadToHead {
                years, min_matches, ..
            } => {
                positive("years", *years)?;
                positive("min_matches", *min_matches)?;
            }
            Self::RecentForm { min_innings, .. } => positive("min_innings", *min_innings)?,
            Self::BestPartnerships {
                success_runs,
                min_partnerships,
                limit,
            } => {
                positive("success_runs", *success_runs)?;
                positive("min_partnerships", *min_partnerships)?;
                positive("limit", *limit)?;
            }
            Self::CareerTrajectory {
                years,
                min_quarter_matches,
                min_quarters,
                ..
            } => {
                positive("years", *years)?;
                positive("min_quarter_matches", *min_quarter_matches)?;
                if *min_quarters < 2 {
                    return Err(invalid("min_quarters", "must be at least 2"));
                }
            }
            Self::LargeVenues { .. }
            | Self::TeamWins
            | Self::PlayersByRole
            | Self::HighestScoreByFormat
            | Self::AllRounders { .. }
            | Self::HomeAway
            | Self::TossAdvantage { .. }
            | Self::FormatExperience { .. }
            | Self::PerformanceRanking { .. } => {}
        }
        Ok(())
    }
}

/// Loosely-typed overrides from a command line or form, applied with
/// [`Query::with_overrides`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOverrides {
    pub country: Option<String>,
    pub format: Option<MatchFormat>,
    /// Calendar year: Q8 start year, Q16 first year, Q19 first year considered.
    pub year: Option<i32>,
    /// The query's main numeric cut-off (capacity, runs, balls).
    pub threshold: Option<u32>,
    /// The query's minimum-sample qualifier.
    pub min_matches: Option<u32>,
    pub limit: Option<u32>,
    pub as_of: Option<NaiveDate>,
}

// ── Execution ───────────────────────────────────────────────────────────────

/// How to evaluate queries that can use window functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Window functions when the engine supports them, otherwise two-pass.
    #[default]
    Auto,
    /// Window functions only.
    Sql,
    /// Fetch ordered rows and rank them in Rust.
    TwoPass,
}

/// Whether the connected SQLite supports window functions (3.25.0+).
pub fn supports_window_functions(conn: &Connection) -> Result<bool, QueryError> {
    Ok(sqlite_version(conn)? >= (3, 25, 0))
}

/// Validate and run a query with the default strategy.
pub fn run_query(conn: &Connection, query: &Query) -> Result<ResultTable, QueryError> {
    run_query_with(conn, query, Strategy::Auto)
}

/// Validate and run a query. Queries never write.
pub fn run_query_with(
    conn: &Connection,
    query: &Query,
    strategy: Strategy,
) -> Result<ResultTable, QueryError> {
    query.validate()?;
    log::debug!("Running {} ({})", query.id(), query.id().title());

    match query {
        Query::PlayersByCountry { country, limit } => {
            basic::players_by_country(conn, country, *limit)
        }
        Query::RecentMatches { limit } => basic::recent_matches(conn, *limit),
        Query::TopRunScorers { format, limit } => basic::top_run_scorers(conn, *format, *limit),
        Query::LargeVenues { min_capacity } => basic::large_venues(conn, *min_capacity),
        Query::TeamWins => basic::team_wins(conn),
        Query::PlayersByRole => basic::players_by_role(conn),
        Query::HighestScoreByFormat => basic::highest_score_by_format(conn),
        Query::SeriesByYear { year } => basic::series_by_year(conn, *year),
        Query::AllRounders {
            min_runs,
            min_wickets,
        } => intermediate::all_rounders(conn, *min_runs, *min_wickets),
        Query::RecentResults { limit } => intermediate::recent_results(conn, *limit),
        Query::FormatComparison { min_formats } => {
            intermediate::format_comparison(conn, *min_formats)
        }
        Query::HomeAway => intermediate::home_away(conn),
        Query::Partnerships { threshold } => intermediate::partnerships(conn, *threshold),
        Query::BowlingByVenue {
            min_overs,
            min_matches,
        } => intermediate::bowling_by_venue(conn, *min_overs, *min_matches),
        Query::CloseMatches {
            max_runs,
            max_wickets,
            min_matches,
        } => intermediate::close_matches(conn, *max_runs, *max_wickets, *min_matches),
        Query::YearlyTrend {
            from_year,
            min_matches,
        } => intermediate::yearly_trend(conn, *from_year, *min_matches),
        Query::TossAdvantage { format } => advanced::toss_advantage(conn, *format),
        Query::EconomicalBowlers {
            min_matches,
            min_avg_overs,
            limit,
        } => advanced::economical_bowlers(conn, *min_matches, *min_avg_overs, *limit),
        Query::Consistency {
            min_balls,
            min_innings,
            since,
            limit,
        } => advanced::consistency(conn, *min_balls, *min_innings, *since, *limit),
        Query::FormatExperience { min_matches } => advanced::format_experience(conn, *min_matches),
        Query::PerformanceRanking { min_matches } => {
            advanced::performance_ranking(conn, *min_matches)
        }
        Query::HeadToHead {
            as_of,
            years,
            min_matches,
        } => advanced::head_to_head(conn, *as_of, *years, *min_matches),
        Query::RecentForm { as_of, min_innings } => {
            let use_sql = match strategy {
                Strategy::Auto => supports_window_functions(conn)?,
                Strategy::Sql => {
                    if !supports_window_functions(conn)? {
                        return Err(QueryError::WindowFunctionsUnavailable { query: query.id() });
                    }
                    true
                }
                Strategy::TwoPass => false,
            };
            if use_sql {
                advanced::recent_form_sql(conn, *as_of, *min_innings)
            } else {
                advanced::recent_form_two_pass(conn, *as_of, *min_innings)
            }
        }
        Query::BestPartnerships {
            success_runs,
            min_partnerships,
            limit,
        } => advanced::best_partnerships(conn, *success_runs, *min_partnerships, *limit),
        Query::CareerTrajectory {
            as_of,
            years,
            min_quarter_matches,
            min_quarters,
        } => advanced::career_trajectory(
            conn,
            *as_of,
            *years,
            *min_quarter_matches,
            *min_quarters,
        ),
    }
}

/// Shared SQL fragment ordering formats Test, ODI, T20I.
pub(crate) const FORMAT_ORDER: &str =
    "CASE {col} WHEN 'Test' THEN 1 WHEN 'ODI' THEN 2 WHEN 'T20I' THEN 3 ELSE 4 END";

pub(crate) fn format_order(col: &str) -> String {
    FORMAT_ORDER.replace("{col}", col)
}
