//! Data model types for the cricket statistics database.
//!
//! These types represent the persistent schema: teams, venues, players,
//! series, matches, and per-innings batting/bowling performances.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string does not name a known enumerated value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

// ── Enumerations ────────────────────────────────────────────────────────────

/// A player's primary role in the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayingRole {
    Batsman,
    Bowler,
    #[serde(rename = "All-rounder")]
    AllRounder,
    #[serde(rename = "Wicket-keeper")]
    WicketKeeper,
}

impl PlayingRole {
    pub const ALL: [PlayingRole; 4] = [
        Self::Batsman,
        Self::Bowler,
        Self::AllRounder,
        Self::WicketKeeper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batsman => "Batsman",
            Self::Bowler => "Bowler",
            Self::AllRounder => "All-rounder",
            Self::WicketKeeper => "Wicket-keeper",
        }
    }
}

impl FromStr for PlayingRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "batsman" | "batter" | "batting" => Ok(Self::Batsman),
            "bowler" | "bowling" => Ok(Self::Bowler),
            "allrounder" => Ok(Self::AllRounder),
            "wicketkeeper" | "wk" | "keeper" | "wkbatsman" => Ok(Self::WicketKeeper),
            _ => Err(ParseEnumError {
                kind: "playing role",
                value: s.to_string(),
                expected: "Batsman, Bowler, All-rounder, Wicket-keeper",
            }),
        }
    }
}

/// International match format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchFormat {
    Test,
    #[serde(rename = "ODI")]
    Odi,
    #[serde(rename = "T20I")]
    T20i,
}

impl MatchFormat {
    pub const ALL: [MatchFormat; 3] = [Self::Test, Self::Odi, Self::T20i];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "Test",
            Self::Odi => "ODI",
            Self::T20i => "T20I",
        }
    }

    /// Whether this is a limited-overs format.
    pub fn is_limited_overs(&self) -> bool {
        !matches!(self, Self::Test)
    }
}

impl FromStr for MatchFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEST" => Ok(Self::Test),
            "ODI" => Ok(Self::Odi),
            "T20I" | "T20" => Ok(Self::T20i),
            _ => Err(ParseEnumError {
                kind: "match format",
                value: s.to_string(),
                expected: "Test, ODI, T20I",
            }),
        }
    }
}

/// What the toss winner chose to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Field,
}

impl TossDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bat => "bat",
            Self::Field => "field",
        }
    }
}

impl FromStr for TossDecision {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bat" | "batting" => Ok(Self::Bat),
            "field" | "fielding" | "bowl" | "bowling" => Ok(Self::Field),
            _ => Err(ParseEnumError {
                kind: "toss decision",
                value: s.to_string(),
                expected: "bat, field",
            }),
        }
    }
}

/// Unit of a victory margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VictoryType {
    Runs,
    Wickets,
}

impl VictoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Runs => "runs",
            Self::Wickets => "wickets",
        }
    }
}

impl FromStr for VictoryType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "runs" | "run" => Ok(Self::Runs),
            "wickets" | "wicket" | "wkts" | "wkt" => Ok(Self::Wickets),
            _ => Err(ParseEnumError {
                kind: "victory type",
                value: s.to_string(),
                expected: "runs, wickets",
            }),
        }
    }
}

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Abandoned,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Live => "Live",
            Self::Completed => "Completed",
            Self::Abandoned => "Abandoned",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" | "upcoming" | "preview" => Ok(Self::Scheduled),
            "live" | "inprogress" | "in progress" => Ok(Self::Live),
            "completed" | "complete" | "result" => Ok(Self::Completed),
            "abandoned" | "abandon" | "washout" | "no result" => Ok(Self::Abandoned),
            _ => Err(ParseEnumError {
                kind: "match status",
                value: s.to_string(),
                expected: "Scheduled, Live, Completed, Abandoned",
            }),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(PlayingRole, MatchFormat, TossDecision, VictoryType, MatchStatus);

// ── Derived rates ───────────────────────────────────────────────────────────

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Runs per 100 balls, rounded to two places. Zero when no balls were faced.
pub fn strike_rate(runs: u32, balls_faced: u32) -> f64 {
    if balls_faced == 0 {
        return 0.0;
    }
    round2(f64::from(runs) * 100.0 / f64::from(balls_faced))
}

/// Runs conceded per over, rounded to two places. Zero when no overs were bowled.
pub fn economy_rate(runs_conceded: u32, overs: f64) -> f64 {
    if overs <= 0.0 {
        return 0.0;
    }
    round2(f64::from(runs_conceded) / overs)
}

// ── Team ────────────────────────────────────────────────────────────────────

/// A national or franchise side.
///
/// The win/loss/match counters are owned by the team-record refresh and
/// are never written through CRUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub total_matches: u32,
    #[serde(default)]
    pub total_wins: u32,
    #[serde(default)]
    pub total_losses: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTeam {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamPatch {
    pub name: Patch<String>,
    pub country: Patch<String>,
}

// ── Venue ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub country: String,
    /// Seating capacity; `None` when unknown.
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVenue {
    pub name: String,
    pub city: String,
    pub country: String,
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenuePatch {
    pub name: Patch<String>,
    pub city: Patch<String>,
    pub country: Patch<String>,
    pub capacity: Patch<u32>,
}

// ── Player ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    /// Identifier from the upstream data provider, if the player was ingested.
    #[serde(default)]
    pub external_id: Option<String>,
    pub full_name: String,
    pub country: String,
    pub playing_role: PlayingRole,
    #[serde(default)]
    pub batting_style: Option<String>,
    #[serde(default)]
    pub bowling_style: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayer {
    pub external_id: Option<String>,
    pub full_name: String,
    pub country: String,
    pub playing_role: PlayingRole,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub team_id: Option<i64>,
}

impl NewPlayer {
    pub fn new(full_name: &str, country: &str, playing_role: PlayingRole) -> Self {
        Self {
            external_id: None,
            full_name: full_name.to_string(),
            country: country.to_string(),
            playing_role,
            batting_style: None,
            bowling_style: None,
            team_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub full_name: Patch<String>,
    pub country: Patch<String>,
    pub playing_role: Patch<PlayingRole>,
    pub batting_style: Patch<String>,
    pub bowling_style: Patch<String>,
    pub team_id: Patch<i64>,
}

/// Career aggregates for one player in one format, computed from
/// performance rows at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerCareer {
    pub player_id: i64,
    pub format: MatchFormat,
    pub matches: u32,
    pub innings: u32,
    pub runs: u32,
    pub balls_faced: u32,
    pub highest_score: Option<u32>,
    pub hundreds: u32,
    pub fifties: u32,
    /// Runs per dismissal; `None` when never dismissed.
    pub batting_average: Option<f64>,
    pub strike_rate: Option<f64>,
    pub wickets: u32,
    /// Runs conceded per wicket; `None` when wicketless.
    pub bowling_average: Option<f64>,
    pub economy_rate: Option<f64>,
}

// ── Series ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    #[serde(default)]
    pub external_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub host_country: Option<String>,
    #[serde(default)]
    pub match_type: Option<MatchFormat>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_matches: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSeries {
    pub external_id: Option<String>,
    pub name: String,
    pub host_country: Option<String>,
    pub match_type: Option<MatchFormat>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_matches: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesPatch {
    pub name: Patch<String>,
    pub host_country: Patch<String>,
    pub match_type: Patch<MatchFormat>,
    pub start_date: Patch<NaiveDate>,
    pub end_date: Patch<NaiveDate>,
    pub total_matches: Patch<u32>,
}

// ── Match ───────────────────────────────────────────────────────────────────

/// Structured winning margin, e.g. 70 runs or 5 wickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryMargin {
    pub margin: u32,
    #[serde(rename = "type")]
    pub kind: VictoryType,
}

impl VictoryMargin {
    pub fn runs(margin: u32) -> Self {
        Self { margin, kind: VictoryType::Runs }
    }

    pub fn wickets(margin: u32) -> Self {
        Self { margin, kind: VictoryType::Wickets }
    }
}

impl fmt::Display for VictoryMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.margin, self.kind)
    }
}

/// A single match. Team, venue and series references become `None` when
/// the referenced row is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub series_id: Option<i64>,
    pub team1_id: Option<i64>,
    pub team2_id: Option<i64>,
    #[serde(default)]
    pub venue_id: Option<i64>,
    pub match_date: NaiveDate,
    pub format: MatchFormat,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub toss_winner_id: Option<i64>,
    #[serde(default)]
    pub toss_decision: Option<TossDecision>,
    #[serde(default)]
    pub winner_id: Option<i64>,
    #[serde(default)]
    pub victory: Option<VictoryMargin>,
    #[serde(default)]
    pub status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub external_id: Option<String>,
    pub series_id: Option<i64>,
    pub team1_id: i64,
    pub team2_id: i64,
    pub venue_id: Option<i64>,
    pub match_date: NaiveDate,
    pub format: MatchFormat,
    pub description: Option<String>,
    pub toss_winner_id: Option<i64>,
    pub toss_decision: Option<TossDecision>,
    pub winner_id: Option<i64>,
    pub victory: Option<VictoryMargin>,
    pub status: MatchStatus,
}

impl NewMatch {
    pub fn new(team1_id: i64, team2_id: i64, match_date: NaiveDate, format: MatchFormat) -> Self {
        Self {
            external_id: None,
            series_id: None,
            team1_id,
            team2_id,
            venue_id: None,
            match_date,
            format,
            description: None,
            toss_winner_id: None,
            toss_decision: None,
            winner_id: None,
            victory: None,
            status: MatchStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchPatch {
    pub series_id: Patch<i64>,
    pub team1_id: Patch<i64>,
    pub team2_id: Patch<i64>,
    pub venue_id: Patch<i64>,
    pub match_date: Patch<NaiveDate>,
    pub format: Patch<MatchFormat>,
    pub description: Patch<String>,
    pub toss_winner_id: Patch<i64>,
    pub toss_decision: Patch<TossDecision>,
    pub winner_id: Patch<i64>,
    pub victory: Patch<VictoryMargin>,
    pub status: Patch<MatchStatus>,
}

// ── Performances ────────────────────────────────────────────────────────────

/// One batsman's innings. `strike_rate` is computed by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingPerformance {
    pub id: i64,
    pub match_id: i64,
    pub player_id: i64,
    pub innings: u32,
    pub batting_position: u32,
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dismissed: bool,
    pub strike_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBatting {
    pub match_id: i64,
    pub player_id: i64,
    pub innings: u32,
    pub batting_position: u32,
    pub runs: u32,
    pub balls_faced: u32,
    #[serde(default)]
    pub fours: u32,
    #[serde(default)]
    pub sixes: u32,
    #[serde(default = "default_true")]
    pub dismissed: bool,
}

/// One bowler's spell in an innings. `economy_rate` is computed by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingPerformance {
    pub id: i64,
    pub match_id: i64,
    pub player_id: i64,
    pub innings: u32,
    pub overs: f64,
    pub maidens: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub economy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBowling {
    pub match_id: i64,
    pub player_id: i64,
    pub innings: u32,
    pub overs: f64,
    #[serde(default)]
    pub maidens: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
}

fn default_true() -> bool {
    true
}

// ── Updates ─────────────────────────────────────────────────────────────────

/// A single-field edit: leave the stored value alone, replace it, or clear it.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T: PartialEq + Clone> Patch<T> {
    /// Resolve against an optional current value. Returns `Some(new)` only
    /// when the result differs from `current`.
    pub fn apply_optional(&self, current: &Option<T>) -> Option<Option<T>> {
        let next = match self {
            Self::Keep => return None,
            Self::Set(v) => Some(v.clone()),
            Self::Clear => None,
        };
        (next != *current).then_some(next)
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `Some` sets the field, `None` leaves it alone.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Keep,
        }
    }
}

// ── Sample data ─────────────────────────────────────────────────────────────

/// A hand-curated dataset with explicit ids, loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleDataset {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub venues: Vec<Venue>,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub batting: Vec<NewBatting>,
    #[serde(default)]
    pub bowling: Vec<NewBowling>,
}

impl SampleDataset {
    /// Append every record of `other` to this dataset.
    pub fn merge(&mut self, other: SampleDataset) {
        self.teams.extend(other.teams);
        self.venues.extend(other.venues);
        self.series.extend(other.series);
        self.players.extend(other.players);
        self.matches.extend(other.matches);
        self.batting.extend(other.batting);
        self.bowling.extend(other.bowling);
    }
}
