pub(crate) mod config;
pub(crate) mod db;
pub(crate) mod entities;
pub(crate) mod fetch;
pub(crate) mod output;
pub(crate) mod query;
pub(crate) mod refresh;

use std::path::{Path, PathBuf};

use cricstat_api::{ApiConfig, ConfigSources};
use cricstat_db::DatabaseConfig;
use rusqlite::Connection;

use crate::CliError;

/// Load settings from the environment and config file, applying `--db`.
pub(crate) fn load_config(db: Option<PathBuf>) -> Result<(ApiConfig, ConfigSources), CliError> {
    let (config, sources) = ApiConfig::load()?;
    Ok((config.with_overrides(None, db), sources))
}

/// Resolve the database path: `--db`, then settings, then the user data directory.
pub(crate) fn database_path(db: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let (config, _) = load_config(db)?;
    config
        .database_path_or_default()
        .ok_or_else(|| CliError::config("could not determine a data directory; pass --db"))
}

/// Open (and create if needed) the database at the resolved path.
pub(crate) fn open_db(db: Option<PathBuf>) -> Result<(Connection, PathBuf), CliError> {
    let path = database_path(db)?;
    let conn = open_at(&path)?;
    Ok((conn, path))
}

pub(crate) fn open_at(path: &Path) -> Result<Connection, CliError> {
    log::debug!("Opening database {}", path.display());
    Ok(cricstat_db::open_database(&DatabaseConfig::new(path))?)
}

/// A multi-threaded runtime for the HTTP commands.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))
}
