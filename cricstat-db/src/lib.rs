//! SQLite persistence layer for cricket statistics.
//!
//! Provides schema creation, CRUD operations, listing queries and the
//! analytical query catalog, backed by SQLite (via rusqlite with the bundled
//! feature).

pub mod analytics;
pub mod operations;
pub mod queries;
pub mod schema;

pub use analytics::{
    run_query, run_query_with, Cell, Query, QueryError, QueryId, QueryOverrides, ResultTable,
    Strategy, Tier,
};
pub use operations::{
    delete_batting, delete_bowling, delete_impact, delete_match, delete_player, delete_series,
    delete_team, delete_venue, insert_batting, insert_bowling, insert_ingest_log, insert_match,
    insert_player, insert_series, insert_team, insert_venue, refresh_team_records,
    seed_from_dataset, update_match, update_player, update_series, update_team, update_venue,
    BatchCounts, Confirmation, DeleteImpact, EntityKind, OperationError, SeedStats,
};
pub use queries::{
    database_stats, find_match_by_external_id, find_player_by_external_id, find_series,
    find_team_by_country, find_team_by_name, find_venue, get_match, get_player, get_series,
    get_team, get_venue, innings_positions_contiguous, list_batting_for_match,
    list_bowling_for_match, list_ingest_logs, list_matches, list_players, list_series,
    list_teams, list_venues, player_career, DatabaseStats, IngestLogEntry, ListOptions,
};
pub use schema::{open_database, open_memory, DatabaseConfig};
