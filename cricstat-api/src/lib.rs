//! Client for the Cricbuzz cricket API (served through RapidAPI).
//!
//! Provides typed access to the match listings, ICC rankings, statistics
//! leaderboards, the team and series catalogs and match scorecards, plus the
//! configuration layer shared with the CLI.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use cache::ResponseCache;
pub use client::CricbuzzClient;
pub use config::{
    ApiConfig, ConfigFile, ConfigSource, ConfigSources, config_path, default_database_path,
    read_config_file, save_to_file, save_to_path,
};
pub use error::{ApiError, ErrorCategory};
pub use types::{
    LeaderboardResponse, LeaderboardStat, ListedMatch, MatchFeed, MatchInfo, MatchesResponse,
    ParseSelectorError, RankingCategory, RankingEntry, RankingsResponse, ScorecardBatter,
    ScorecardBowler, ScorecardInnings, ScorecardResponse, SeriesListEntry, SeriesListResponse,
    StatsFormat, TeamListEntry, TeamsResponse,
};
