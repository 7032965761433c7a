//! Normalize Cricbuzz payloads into catalog values.
//!
//! Everything here is pure: no database access. Records that fail a
//! data-quality check come back as a [`SkipReason`].

use chrono::{DateTime, NaiveDate};
use cricstat_api::ListedMatch;
use cricstat_catalog::types::{MatchFormat, MatchStatus, VictoryMargin, VictoryType};

/// Epoch values above this are milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

pub const UNKNOWN_CITY: &str = "Unknown";
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Why an external record was not ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    MissingId,
    InvalidDate,
    MissingTeams,
    SameTeams,
    MissingName,
    MissingCountry,
    Rejected,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingId => "missing external id",
            Self::InvalidDate => "missing or unparseable start date",
            Self::MissingTeams => "missing team names",
            Self::SameTeams => "both sides are the same team",
            Self::MissingName => "missing name",
            Self::MissingCountry => "missing player country",
            Self::Rejected => "rejected by database validation",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the fixture an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team1,
    Team2,
}

/// A team as named in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTeam {
    pub name: String,
    pub short_name: Option<String>,
}

impl ExternalTeam {
    fn matches(&self, text: &str) -> bool {
        let text = text.trim();
        self.name.eq_ignore_ascii_case(text)
            || self
                .short_name
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(text))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalVenue {
    pub name: String,
    pub city: String,
}

/// Winner and margin parsed from result text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResult {
    pub winner: String,
    pub victory: Option<VictoryMargin>,
}

/// A match normalized from the Cricbuzz listing, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalMatch {
    pub external_id: String,
    pub series_external_id: Option<String>,
    pub series_name: Option<String>,
    pub description: Option<String>,
    pub format: MatchFormat,
    pub match_date: NaiveDate,
    pub status: MatchStatus,
    pub team1: ExternalTeam,
    pub team2: ExternalTeam,
    pub venue: Option<ExternalVenue>,
    pub winner: Option<Side>,
    pub victory: Option<VictoryMargin>,
}

impl ExternalMatch {
    /// A short label for progress and skip messages.
    pub fn label(&self) -> String {
        format!("{} v {} ({})", self.team1.name, self.team2.name, self.external_id)
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Convert an epoch timestamp (seconds or milliseconds, as text) to a UTC date.
pub fn normalize_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let value = match raw.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
            f.trunc() as i64
        }
    };
    if value < 0 {
        return None;
    }
    let seconds = if value > MILLIS_THRESHOLD {
        value / 1000
    } else {
        value
    };
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

/// Map a Cricbuzz format string. Unknown formats fall back to T20I.
pub fn map_format(raw: Option<&str>) -> MatchFormat {
    match raw.map(|r| r.trim().parse::<MatchFormat>()) {
        Some(Ok(format)) => format,
        Some(Err(_)) => {
            log::debug!("Unknown match format {:?}, defaulting to T20I", raw);
            MatchFormat::T20i
        }
        None => MatchFormat::T20i,
    }
}

fn status_from_text(text: &str) -> Option<MatchStatus> {
    let key = text.trim().to_ascii_lowercase();
    const ABANDONED: &[&str] = &["abandon", "washout", "no result", "called off", "cancelled"];
    const COMPLETED: &[&str] = &["complete", "result", " won by", "drawn", "tied"];
    const LIVE: &[&str] = &[
        "live",
        "in progress",
        "inprogress",
        "innings break",
        "stumps",
        "lunch",
        "drinks",
        "rain",
    ];
    const SCHEDULED: &[&str] = &["upcoming", "preview", "scheduled", "toss"];

    let contains_any = |tokens: &[&str]| tokens.iter().any(|t| key.contains(t));
    if contains_any(ABANDONED) {
        Some(MatchStatus::Abandoned)
    } else if contains_any(COMPLETED) {
        Some(MatchStatus::Completed)
    } else if contains_any(LIVE) {
        Some(MatchStatus::Live)
    } else if contains_any(SCHEDULED) {
        Some(MatchStatus::Scheduled)
    } else {
        None
    }
}

/// Map the lifecycle state (falling back to status text). Unknown → Scheduled.
pub fn map_status(state: Option<&str>, status_text: Option<&str>) -> MatchStatus {
    state
        .and_then(status_from_text)
        .or_else(|| status_text.and_then(status_from_text))
        .unwrap_or_default()
}

/// Parse result text such as "India won by 5 wkts" or
/// "Australia won by an innings and 32 runs".
pub fn parse_result(text: &str) -> Option<ParsedResult> {
    let lower = text.to_ascii_lowercase();
    let idx = lower.find(" won")?;
    let winner = text[..idx].trim();
    if winner.is_empty() {
        return None;
    }

    let rest = lower[idx + " won".len()..].trim_start();
    if rest.starts_with("the toss") {
        return None;
    }
    let victory = rest.strip_prefix("by ").and_then(|margin| {
        let margin = margin.strip_prefix("an innings and ").unwrap_or(margin);
        let mut words = margin.split_whitespace();
        let amount = words.next()?.parse::<u32>().ok()?;
        let unit = words
            .next()?
            .trim_matches(|c: char| !c.is_ascii_alphabetic())
            .parse::<VictoryType>()
            .ok()?;
        Some(match unit {
            VictoryType::Runs => VictoryMargin::runs(amount),
            VictoryType::Wickets => VictoryMargin::wickets(amount),
        })
    });

    Some(ParsedResult {
        winner: winner.to_string(),
        victory,
    })
}

/// Resolve which side a parsed winner refers to.
pub fn winning_side(result: &ParsedResult, team1: &ExternalTeam, team2: &ExternalTeam) -> Option<Side> {
    if team1.matches(&result.winner) {
        Some(Side::Team1)
    } else if team2.matches(&result.winner) {
        Some(Side::Team2)
    } else {
        None
    }
}

fn external_team(info: Option<&cricstat_api::types::TeamInfo>) -> Option<ExternalTeam> {
    let info = info?;
    Some(ExternalTeam {
        name: non_empty(info.team_name.as_deref())?,
        short_name: non_empty(info.team_s_name.as_deref()),
    })
}

/// Normalize one listed match, or report why it cannot be ingested.
pub fn normalize_match(listed: &ListedMatch<'_>) -> Result<ExternalMatch, SkipReason> {
    let info = listed.info;
    let external_id = non_empty(info.match_id.as_deref()).ok_or(SkipReason::MissingId)?;
    let match_date = info
        .start_date
        .as_deref()
        .and_then(normalize_timestamp)
        .ok_or(SkipReason::InvalidDate)?;

    let (team1, team2) = match (external_team(info.team1.as_ref()), external_team(info.team2.as_ref())) {
        (Some(t1), Some(t2)) => (t1, t2),
        _ => return Err(SkipReason::MissingTeams),
    };
    if team1.name.eq_ignore_ascii_case(&team2.name) {
        return Err(SkipReason::SameTeams);
    }

    let venue = info.venue_info.as_ref().and_then(|v| {
        Some(ExternalVenue {
            name: non_empty(v.ground.as_deref())?,
            city: non_empty(v.city.as_deref()).unwrap_or_else(|| UNKNOWN_CITY.to_string()),
        })
    });

    let status = map_status(info.state.as_deref(), info.status.as_deref());
    let (winner, victory) = if status == MatchStatus::Completed {
        match info.status.as_deref().and_then(parse_result) {
            Some(result) => match winning_side(&result, &team1, &team2) {
                Some(side) => (Some(side), result.victory),
                None => {
                    log::debug!(
                        "Result names '{}', which is neither {} nor {}",
                        result.winner,
                        team1.name,
                        team2.name
                    );
                    (None, None)
                }
            },
            None => (None, None),
        }
    } else {
        (None, None)
    };

    Ok(ExternalMatch {
        external_id,
        series_external_id: non_empty(listed.series_id),
        series_name: non_empty(listed.series_name),
        description: non_empty(info.match_desc.as_deref()),
        format: map_format(info.match_format.as_deref()),
        match_date,
        status,
        team1,
        team2,
        venue,
        winner,
        victory,
    })
}

#[cfg(test)]
#[path = "tests/mapping_tests.rs"]
mod tests;
