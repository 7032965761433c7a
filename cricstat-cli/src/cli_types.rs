//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use cricstat_api::{LeaderboardStat, MatchFeed, RankingCategory, StatsFormat};
use cricstat_catalog::{MatchFormat, MatchStatus, PlayingRole, TossDecision, VictoryMargin};
use cricstat_db::{QueryId, Strategy};

#[derive(Parser)]
#[command(name = "cricstat")]
#[command(about = "Cricket statistics: analytical queries, data management and API refresh", long_about = None)]
pub(crate) struct Cli {
    /// Path to the SQLite database (default: $CRICSTAT_DB, the config file, or the user data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Browse and run the analytical query catalog
    Query {
        #[command(subcommand)]
        action: QueryAction,
    },

    /// Manage players
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },

    /// Manage teams
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Manage venues
    Venue {
        #[command(subcommand)]
        action: VenueAction,
    },

    /// Manage series
    Series {
        #[command(subcommand)]
        action: SeriesAction,
    },

    /// Manage matches
    Match {
        #[command(subcommand)]
        action: MatchAction,
    },

    /// Create, inspect, seed and reset the database
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Fetch match feeds (and optionally rankings) from Cricbuzz and ingest them
    Refresh {
        /// Feeds to fetch (e.g., recent,live,upcoming)
        #[arg(long, value_delimiter = ',', default_values_t = MatchFeed::ALL.to_vec())]
        feeds: Vec<MatchFeed>,

        /// Also ingest every ranking table (batsmen, bowlers, all-rounders in all formats)
        #[arg(long)]
        rankings: bool,

        /// Also ingest the international team list
        #[arg(long)]
        teams: bool,

        /// Also ingest the international series calendar
        #[arg(long)]
        series: bool,
    },

    /// Fetch raw data from Cricbuzz without writing to the database
    Fetch {
        #[command(subcommand)]
        action: FetchAction,
    },

    /// Manage API and database configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

// ── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Common arguments for commands that print a result table.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

// ── Query ───────────────────────────────────────────────────────────────────

#[derive(Subcommand)]
pub(crate) enum QueryAction {
    /// List the catalog queries by tier
    List,

    /// Run one query (e.g., Q13, q13 or 13)
    Run {
        id: QueryId,

        #[command(flatten)]
        params: QueryArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Parameter overrides for `query run`. Each query accepts only the ones it uses.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct QueryArgs {
    /// Country name (Q1)
    #[arg(long)]
    pub country: Option<String>,

    /// Match format: Test, ODI or T20I (Q3, Q17)
    #[arg(long)]
    pub format: Option<MatchFormat>,

    /// Calendar year (Q8 start year, Q16 first year, Q19 first year considered)
    #[arg(long)]
    pub year: Option<i32>,

    /// The query's main numeric cut-off: capacity, runs or balls
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Minimum matches, innings or partnerships to qualify
    #[arg(long)]
    pub min_matches: Option<u32>,

    /// Maximum rows
    #[arg(long)]
    pub limit: Option<u32>,

    /// Reference date for trailing windows (Q22, Q23, Q25; default: today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Evaluation strategy for queries that can use window functions
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum StrategyArg {
    #[default]
    Auto,
    Sql,
    TwoPass,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Strategy::Auto,
            StrategyArg::Sql => Strategy::Sql,
            StrategyArg::TwoPass => Strategy::TwoPass,
        }
    }
}

// ── Entities ────────────────────────────────────────────────────────────────

/// Paging and search for `list` subcommands.
#[derive(Args, Clone, Debug)]
pub(crate) struct ListArgs {
    /// Case-insensitive name search
    #[arg(long, short)]
    pub search: Option<String>,

    /// Maximum rows
    #[arg(long, default_value = "50")]
    pub limit: u32,

    /// Rows to skip
    #[arg(long, default_value = "0")]
    pub offset: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Fields to clear during an update (comma-separated names).
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct ClearArgs {
    /// Optional fields to clear (e.g., batting_style,team)
    #[arg(long, value_delimiter = ',')]
    pub clear: Vec<String>,
}

#[derive(Subcommand)]
pub(crate) enum PlayerAction {
    /// Add a player
    Add {
        /// Full name
        name: String,

        #[arg(long)]
        country: String,

        /// Batsman, Bowler, All-rounder or Wicket-keeper
        #[arg(long)]
        role: PlayingRole,

        #[arg(long)]
        batting_style: Option<String>,

        #[arg(long)]
        bowling_style: Option<String>,

        /// Team id
        #[arg(long)]
        team: Option<i64>,
    },

    /// Show a player with career statistics
    Show { id: i64 },

    /// List players (search also matches team names)
    List(ListArgs),

    /// Update a player. Blank values are ignored; use --clear to remove a value
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        role: Option<PlayingRole>,

        #[arg(long)]
        batting_style: Option<String>,

        #[arg(long)]
        bowling_style: Option<String>,

        #[arg(long)]
        team: Option<i64>,

        #[command(flatten)]
        clear: ClearArgs,
    },

    /// Delete a player and their performance rows
    Delete {
        id: i64,

        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum TeamAction {
    /// Add a team
    Add {
        name: String,

        /// Country (default: the team name)
        #[arg(long)]
        country: Option<String>,
    },

    /// Show a team with its win/loss record
    Show { id: i64 },

    /// List teams
    List(ListArgs),

    /// Update a team
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        country: Option<String>,
    },

    /// Delete a team; matches and players referencing it keep an empty reference
    Delete {
        id: i64,

        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum VenueAction {
    /// Add a venue
    Add {
        name: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        country: String,

        /// Seating capacity
        #[arg(long)]
        capacity: Option<u32>,
    },

    /// Show a venue
    Show { id: i64 },

    /// List venues
    List(ListArgs),

    /// Update a venue. Use --clear capacity to mark the capacity unknown
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        capacity: Option<u32>,

        #[command(flatten)]
        clear: ClearArgs,
    },

    /// Delete a venue; matches played there keep an empty reference
    Delete {
        id: i64,

        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum SeriesAction {
    /// Add a series
    Add {
        name: String,

        #[arg(long)]
        host_country: Option<String>,

        /// Test, ODI or T20I
        #[arg(long)]
        match_type: Option<MatchFormat>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long)]
        total_matches: Option<u32>,
    },

    /// Show a series
    Show { id: i64 },

    /// List series
    List(ListArgs),

    /// Update a series
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        host_country: Option<String>,

        #[arg(long)]
        match_type: Option<MatchFormat>,

        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long)]
        total_matches: Option<u32>,

        #[command(flatten)]
        clear: ClearArgs,
    },

    /// Delete a series; its matches keep an empty reference
    Delete {
        id: i64,

        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },
}

/// Match fields shared by `match add` and `match update`.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct MatchFields {
    /// Series id
    #[arg(long)]
    pub series: Option<i64>,

    /// Venue id
    #[arg(long)]
    pub venue: Option<i64>,

    #[arg(long)]
    pub description: Option<String>,

    /// Team id that won the toss
    #[arg(long)]
    pub toss_winner: Option<i64>,

    /// bat or field
    #[arg(long)]
    pub toss_decision: Option<TossDecision>,

    /// Winning team id
    #[arg(long)]
    pub winner: Option<i64>,

    /// Winning margin (e.g., "70 runs", "5 wkts")
    #[arg(long, value_parser = parse_margin)]
    pub margin: Option<VictoryMargin>,

    /// Scheduled, Live, Completed or Abandoned
    #[arg(long)]
    pub status: Option<MatchStatus>,
}

#[derive(Subcommand)]
pub(crate) enum MatchAction {
    /// Add a match
    Add {
        /// First team id
        #[arg(long)]
        team1: i64,

        /// Second team id
        #[arg(long)]
        team2: i64,

        /// Match date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Test, ODI or T20I
        #[arg(long)]
        format: MatchFormat,

        #[command(flatten)]
        fields: MatchFields,
    },

    /// Show a match with its scorecard rows
    Show { id: i64 },

    /// List matches, most recent first
    List(ListArgs),

    /// Update a match
    Update {
        id: i64,

        #[arg(long)]
        team1: Option<i64>,

        #[arg(long)]
        team2: Option<i64>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        format: Option<MatchFormat>,

        #[command(flatten)]
        fields: MatchFields,

        #[command(flatten)]
        clear: ClearArgs,
    },

    /// Delete a match and its performance rows
    Delete {
        id: i64,

        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },
}

/// Parse a winning margin such as `70 runs`, `5 wkts` or `5 wickets`.
pub(crate) fn parse_margin(text: &str) -> Result<VictoryMargin, String> {
    let mut parts = text.split_whitespace();
    let (Some(number), Some(kind), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected '<number> runs|wickets', got '{}'", text));
    };
    let margin: u32 = number
        .parse()
        .map_err(|_| format!("invalid margin number '{}'", number))?;
    let kind = kind.parse().map_err(|e| format!("{}", e))?;
    Ok(VictoryMargin { margin, kind })
}

// ── Database ────────────────────────────────────────────────────────────────

#[derive(Subcommand)]
pub(crate) enum DbAction {
    /// Create the database and schema if missing
    Init,

    /// Show row counts and recent ingestion batches
    Stats,

    /// Load a YAML sample dataset (file or directory); safe to repeat
    Seed {
        /// Path to a .yaml file or a directory of them
        path: PathBuf,
    },

    /// Recompute every team's match, win and loss counters
    RefreshTeams,

    /// Delete and recreate the database
    Reset {
        /// Confirm the reset
        #[arg(long)]
        confirm: bool,
    },
}

// ── Fetch ───────────────────────────────────────────────────────────────────

#[derive(Subcommand)]
pub(crate) enum FetchAction {
    /// List matches from a feed: recent, live or upcoming
    Matches {
        feed: MatchFeed,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show an ICC ranking table
    Rankings {
        /// batsmen, bowlers or allrounders
        category: RankingCategory,

        /// test, odi or t20
        format: StatsFormat,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show a statistics leaderboard (e.g., mostRuns, highestSr)
    Leaderboard {
        stat: LeaderboardStat,

        /// test, odi or t20
        format: StatsFormat,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List international teams
    Teams {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the international series calendar
    Series {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show a match scorecard by Cricbuzz match id
    Scorecard {
        match_id: String,

        /// Show bowling figures instead of batting
        #[arg(long)]
        bowling: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

// ── Config ──────────────────────────────────────────────────────────────────

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Save settings to the config file
    Set {
        /// RapidAPI key
        #[arg(long)]
        key: Option<String>,

        /// RapidAPI host
        #[arg(long)]
        host: Option<String>,

        /// Response cache lifetime in seconds (0 disables caching)
        #[arg(long)]
        cache_ttl: Option<u64>,

        /// Default database path
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Test the API key against the Cricbuzz API
    Test,

    /// Print the config file path
    Path,
}
