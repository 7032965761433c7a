use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Accept a JSON string or number; anything else becomes `None`.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.and_then(|v| value_to_string(&v)))
}

fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Endpoint selectors ──────────────────────────────────────────────────────

/// Which match listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchFeed {
    Recent,
    Live,
    Upcoming,
}

impl MatchFeed {
    pub const ALL: [MatchFeed; 3] = [Self::Recent, Self::Live, Self::Upcoming];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Live => "live",
            Self::Upcoming => "upcoming",
        }
    }

    pub fn path(&self) -> String {
        format!("matches/v1/{}", self.as_str())
    }
}

/// Ranking table category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RankingCategory {
    Batsmen,
    Bowlers,
    AllRounders,
}

impl RankingCategory {
    pub const ALL: [RankingCategory; 3] = [Self::Batsmen, Self::Bowlers, Self::AllRounders];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batsmen => "batsmen",
            Self::Bowlers => "bowlers",
            Self::AllRounders => "allrounders",
        }
    }
}

/// Format selector used by the rankings and leaderboard endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatsFormat {
    Test,
    Odi,
    T20,
}

impl StatsFormat {
    pub const ALL: [StatsFormat; 3] = [Self::Test, Self::Odi, Self::T20];

    /// Value of the `formatType` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Odi => "odi",
            Self::T20 => "t20",
        }
    }

    /// Value of the `matchType` query parameter on leaderboards.
    pub fn match_type_code(&self) -> u8 {
        match self {
            Self::Test => 1,
            Self::Odi => 2,
            Self::T20 => 3,
        }
    }
}

/// Leaderboard statistic (`statsType` on `stats/v1/topstats`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LeaderboardStat {
    MostRuns,
    HighestScore,
    HighestAverage,
    HighestStrikeRate,
    MostHundreds,
    MostFifties,
    MostSixes,
    MostWickets,
    LowestAverage,
    LowestEconomy,
    MostFiveWickets,
}

impl LeaderboardStat {
    pub const ALL: [LeaderboardStat; 11] = [
        Self::MostRuns,
        Self::HighestScore,
        Self::HighestAverage,
        Self::HighestStrikeRate,
        Self::MostHundreds,
        Self::MostFifties,
        Self::MostSixes,
        Self::MostWickets,
        Self::LowestAverage,
        Self::LowestEconomy,
        Self::MostFiveWickets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MostRuns => "mostRuns",
            Self::HighestScore => "highestScore",
            Self::HighestAverage => "highestAvg",
            Self::HighestStrikeRate => "highestSr",
            Self::MostHundreds => "mostHundreds",
            Self::MostFifties => "mostFifties",
            Self::MostSixes => "mostSixes",
            Self::MostWickets => "mostWickets",
            Self::LowestAverage => "lowestAvg",
            Self::LowestEconomy => "lowestEcon",
            Self::MostFiveWickets => "mostFiveWickets",
        }
    }
}

/// Error for an unrecognised selector string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseSelectorError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

fn parse_selector<T: Copy>(
    kind: &'static str,
    value: &str,
    all: &[T],
    names: impl Fn(&T) -> &'static str,
    aliases: &[(&str, T)],
) -> Result<T, ParseSelectorError> {
    let wanted = value.trim().to_ascii_lowercase();
    all.iter()
        .find(|v| names(v).eq_ignore_ascii_case(&wanted))
        .copied()
        .or_else(|| aliases.iter().find(|(a, _)| *a == wanted).map(|(_, v)| *v))
        .ok_or_else(|| ParseSelectorError {
            kind,
            value: value.to_string(),
            expected: all.iter().map(|v| names(v)).collect::<Vec<_>>().join(", "),
        })
}

impl FromStr for MatchFeed {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector("feed", s, &Self::ALL, Self::as_str, &[])
    }
}

impl FromStr for RankingCategory {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(
            "ranking category",
            s,
            &Self::ALL,
            Self::as_str,
            &[
                ("batting", Self::Batsmen),
                ("batters", Self::Batsmen),
                ("bowling", Self::Bowlers),
                ("all-rounders", Self::AllRounders),
            ],
        )
    }
}

impl FromStr for StatsFormat {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector("format", s, &Self::ALL, Self::as_str, &[("t20i", Self::T20)])
    }
}

impl FromStr for LeaderboardStat {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector("statistic", s, &Self::ALL, Self::as_str, &[])
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(MatchFeed, RankingCategory, StatsFormat, LeaderboardStat);

// ── Match listings ──────────────────────────────────────────────────────────

/// Top-level response from `matches/v1/{recent,live,upcoming}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesResponse {
    #[serde(default)]
    pub type_matches: Vec<TypeMatches>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMatches {
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub series_matches: Vec<SeriesMatches>,
}

/// One entry of `seriesMatches`; advert entries carry no wrapper.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMatches {
    #[serde(default)]
    pub series_ad_wrapper: Option<SeriesWrapper>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesWrapper {
    #[serde(default, deserialize_with = "string_or_number")]
    pub series_id: Option<String>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub matches: Vec<MatchEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEntry {
    #[serde(default)]
    pub match_info: Option<MatchInfo>,
}

/// Match metadata as reported by Cricbuzz.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    pub match_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub series_id: Option<String>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub match_desc: Option<String>,
    #[serde(default)]
    pub match_format: Option<String>,
    /// Epoch milliseconds or seconds, as a number or numeric string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub end_date: Option<String>,
    /// Lifecycle state, e.g. "Complete", "In Progress", "Upcoming".
    #[serde(default)]
    pub state: Option<String>,
    /// Human-readable status or result text.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub team1: Option<TeamInfo>,
    #[serde(default)]
    pub team2: Option<TeamInfo>,
    #[serde(default)]
    pub venue_info: Option<VenueInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_s_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub ground: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// A match together with the series block it was listed under.
#[derive(Debug, Clone)]
pub struct ListedMatch<'a> {
    pub series_id: Option<&'a str>,
    pub series_name: Option<&'a str>,
    pub info: &'a MatchInfo,
}

impl MatchesResponse {
    /// Flatten `typeMatches → seriesMatches → matches`.
    pub fn matches(&self) -> impl Iterator<Item = ListedMatch<'_>> {
        self.type_matches
            .iter()
            .flat_map(|t| t.series_matches.iter())
            .filter_map(|s| s.series_ad_wrapper.as_ref())
            .flat_map(|wrapper| {
                wrapper.matches.iter().filter_map(move |m| {
                    m.match_info.as_ref().map(|info| ListedMatch {
                        series_id: info.series_id.as_deref().or(wrapper.series_id.as_deref()),
                        series_name: info
                            .series_name
                            .as_deref()
                            .or(wrapper.series_name.as_deref()),
                        info,
                    })
                })
            })
    }
}

// ── Rankings ────────────────────────────────────────────────────────────────

/// Response from `stats/v1/rankings/{category}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RankingsResponse {
    #[serde(default)]
    pub rank: Vec<RankingEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RankingEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub rank: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub points: Option<String>,
}

impl RankingEntry {
    pub fn rank_number(&self) -> Option<u32> {
        self.rank.as_deref().and_then(|r| r.parse().ok())
    }

    pub fn rating_number(&self) -> Option<u32> {
        self.rating.as_deref().and_then(|r| r.parse().ok())
    }
}

// ── Leaderboards ────────────────────────────────────────────────────────────

/// Response from `stats/v1/topstats/0`: a header row plus positional values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub values: Vec<LeaderboardRow>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeaderboardRow {
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

impl LeaderboardRow {
    /// Cells as display strings; non-scalar cells become empty.
    pub fn cells(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| value_to_string(v).unwrap_or_default())
            .collect()
    }
}

// ── Teams and series ───────────────────────────────────────────────────────

/// Response from `teams/v1/international`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TeamsResponse {
    #[serde(default)]
    pub list: Vec<TeamListEntry>,
}

/// One row of the team list. Rows without an id are section headings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_s_name: Option<String>,
}

impl TeamsResponse {
    /// Team rows, skipping section headings.
    pub fn teams(&self) -> impl Iterator<Item = &TeamListEntry> {
        self.list.iter().filter(|t| t.team_id.is_some())
    }
}

/// Response from `series/v1/international`, grouped by month.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesListResponse {
    #[serde(default)]
    pub series_map_proto: Vec<SeriesMonth>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeriesMonth {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub series: Vec<SeriesListEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesListEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Epoch milliseconds, as a number or numeric string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub start_dt: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub end_dt: Option<String>,
}

impl SeriesListResponse {
    /// Flatten the month groups.
    pub fn series(&self) -> impl Iterator<Item = &SeriesListEntry> {
        self.series_map_proto.iter().flat_map(|m| m.series.iter())
    }
}

// ── Scorecards ──────────────────────────────────────────────────────────────

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value
        .and_then(|v| value_to_string(&v))
        .and_then(|s| s.parse().ok()))
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value
        .and_then(|v| value_to_string(&v))
        .and_then(|s| s.parse().ok())
        .filter(|f: &f64| f.is_finite()))
}

/// Response from `mcenter/v1/{id}/hscard`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardResponse {
    #[serde(default, alias = "scorecard")]
    pub score_card: Vec<ScorecardInnings>,
    #[serde(default)]
    pub match_header: Option<MatchHeader>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchHeader {
    #[serde(default, deserialize_with = "string_or_number")]
    pub match_id: Option<String>,
    #[serde(default)]
    pub match_description: Option<String>,
    #[serde(default)]
    pub match_format: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardInnings {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub innings_id: Option<u32>,
    #[serde(default)]
    pub bat_team_details: Option<BatTeamDetails>,
    #[serde(default)]
    pub bowl_team_details: Option<BowlTeamDetails>,
    #[serde(default)]
    pub score_details: Option<ScoreDetails>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatTeamDetails {
    #[serde(default)]
    pub bat_team_name: Option<String>,
    /// Keyed `bat_1`, `bat_2`, ... in batting order.
    #[serde(default)]
    pub batsmen_data: BTreeMap<String, ScorecardBatter>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlTeamDetails {
    #[serde(default)]
    pub bowl_team_name: Option<String>,
    /// Keyed `bowl_1`, `bowl_2`, ... in bowling order.
    #[serde(default)]
    pub bowlers_data: BTreeMap<String, ScorecardBowler>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardBatter {
    #[serde(default, deserialize_with = "string_or_number")]
    pub bat_id: Option<String>,
    #[serde(default)]
    pub bat_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub balls: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub fours: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub sixes: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub strike_rate: Option<f64>,
    /// Dismissal text; empty or "batting" while not out.
    #[serde(default)]
    pub out_desc: Option<String>,
}

impl ScorecardBatter {
    pub fn is_out(&self) -> bool {
        match self.out_desc.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(d) => !d.eq_ignore_ascii_case("batting") && !d.eq_ignore_ascii_case("not out"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardBowler {
    #[serde(default, alias = "bowlId", deserialize_with = "string_or_number")]
    pub bowler_id: Option<String>,
    #[serde(default)]
    pub bowl_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overs: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub maidens: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub wickets: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub economy: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetails {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub runs: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub wickets: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overs: Option<f64>,
}

/// Numeric suffix of a `bat_N` / `bowl_N` key.
fn slot_number(key: &str) -> Option<u32> {
    key.rsplit('_').next().and_then(|n| n.parse().ok())
}

/// Map entries ordered by slot number; keys without one sort last.
fn ordered<T>(map: &BTreeMap<String, T>) -> Vec<(Option<u32>, &T)> {
    let mut rows: Vec<_> = map.iter().map(|(k, v)| (slot_number(k), v)).collect();
    rows.sort_by_key(|(n, _)| n.unwrap_or(u32::MAX));
    rows
}

impl ScorecardInnings {
    /// Batters in batting order, paired with their position.
    pub fn batters(&self) -> Vec<(Option<u32>, &ScorecardBatter)> {
        self.bat_team_details
            .as_ref()
            .map(|d| ordered(&d.batsmen_data))
            .unwrap_or_default()
    }

    /// Bowlers in the order they came on.
    pub fn bowlers(&self) -> Vec<&ScorecardBowler> {
        self.bowl_team_details
            .as_ref()
            .map(|d| ordered(&d.bowlers_data).into_iter().map(|(_, b)| b).collect())
            .unwrap_or_default()
    }

    pub fn batting_team(&self) -> Option<&str> {
        self.bat_team_details
            .as_ref()
            .and_then(|d| d.bat_team_name.as_deref())
    }

    pub fn bowling_team(&self) -> Option<&str> {
        self.bowl_team_details
            .as_ref()
            .and_then(|d| d.bowl_team_name.as_deref())
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
