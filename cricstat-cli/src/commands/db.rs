use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cricstat_db::schema::{CURRENT_VERSION, get_schema_version};

use crate::CliError;
use crate::cli_types::DbAction;

pub(crate) fn run_db(db: Option<PathBuf>, action: DbAction) -> Result<(), CliError> {
    match action {
        DbAction::Init => run_db_init(db),
        DbAction::Stats => run_db_stats(db),
        DbAction::Seed { path } => run_db_seed(db, &path),
        DbAction::RefreshTeams => run_db_refresh_teams(db),
        DbAction::Reset { confirm } => run_db_reset(db, confirm),
    }
}

fn run_db_init(db: Option<PathBuf>) -> Result<(), CliError> {
    let path = super::database_path(db)?;
    let existed = path.exists();
    let conn = super::open_at(&path)?;
    let version = get_schema_version(&conn)?;

    if existed {
        log::info!("Database already exists (schema v{}).", version);
    } else {
        log::info!(
            "{}",
            "Database created.".if_supports_color(Stdout, |t| t.bold()),
        );
    }
    log::info!("  Path: {}", path.display().if_supports_color(Stdout, |t| t.cyan()));
    Ok(())
}

fn run_db_stats(db: Option<PathBuf>) -> Result<(), CliError> {
    let path = super::database_path(db)?;
    if !path.exists() {
        log::warn!("No database found at {}", path.display());
        log::info!("Run 'cricstat db init' or 'cricstat db seed <file>' to create one.");
        return Ok(());
    }

    let conn = super::open_at(&path)?;
    let stats = cricstat_db::database_stats(&conn)?;

    log::info!(
        "{}",
        "Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", path.display());
    log::info!("  Schema:   v{}", get_schema_version(&conn)?);
    crate::log_blank();
    log::info!("  Teams:          {:>8}", stats.teams);
    log::info!("  Venues:         {:>8}", stats.venues);
    log::info!("  Players:        {:>8}", stats.players);
    log::info!("  Series:         {:>8}", stats.series);
    log::info!(
        "  Matches:        {:>8} ({} completed)",
        stats.matches,
        stats.completed_matches,
    );
    log::info!("  Batting rows:   {:>8}", stats.batting_rows);
    log::info!("  Bowling rows:   {:>8}", stats.bowling_rows);

    let batches = cricstat_db::list_ingest_logs(&conn, 5)?;
    if !batches.is_empty() {
        crate::log_blank();
        log::info!(
            "{} ({} total)",
            "Recent ingestion batches".if_supports_color(Stdout, |t| t.bold()),
            stats.ingest_batches,
        );
        for b in batches {
            log::info!(
                "  {} {}/{}: {} created, {} updated, {} unchanged, {} skipped",
                b.ingested_at.if_supports_color(Stdout, |t| t.dimmed()),
                b.source,
                b.feed,
                b.created,
                b.updated,
                b.unchanged,
                b.skipped,
            );
        }
    }
    Ok(())
}

fn run_db_seed(db: Option<PathBuf>, dataset: &Path) -> Result<(), CliError> {
    let data = cricstat_catalog::load_dataset(dataset)?;
    let (conn, path) = super::open_db(db)?;
    let stats = cricstat_db::seed_from_dataset(&conn, &data)?;

    log::info!(
        "{} {}",
        "Seeded".if_supports_color(Stdout, |t| t.bold()),
        dataset.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!("  Teams:          {:>8}", stats.teams);
    log::info!("  Venues:         {:>8}", stats.venues);
    log::info!("  Series:         {:>8}", stats.series);
    log::info!("  Players:        {:>8}", stats.players);
    log::info!("  Matches:        {:>8}", stats.matches);
    log::info!("  Batting rows:   {:>8}", stats.batting);
    log::info!("  Bowling rows:   {:>8}", stats.bowling);
    if !stats.position_gaps.is_empty() {
        log::warn!(
            "  {} innings have gaps in batting positions; partnership queries (Q13, Q24) skip the missing pairs",
            stats.position_gaps.len()
        );
    }
    log::info!("  Database: {}", path.display());
    Ok(())
}

fn run_db_refresh_teams(db: Option<PathBuf>) -> Result<(), CliError> {
    let (conn, _) = super::open_db(db)?;
    let updated = cricstat_db::refresh_team_records(&conn)?;
    log::info!("Recomputed records for {} team(s).", updated);
    Ok(())
}

/// Delete and recreate the database, including its WAL side files.
fn run_db_reset(db: Option<PathBuf>, confirm: bool) -> Result<(), CliError> {
    let path = super::database_path(db)?;

    if !confirm {
        log::warn!(
            "This will permanently delete the database at:\n  {}",
            path.display(),
        );
        log::info!("Re-run with --confirm to proceed:");
        log::info!("  cricstat db reset --confirm");
        return Ok(());
    }

    if path.exists() {
        let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        std::fs::remove_file(&path)?;
        for suffix in ["-wal", "-shm"] {
            let mut side = path.clone().into_os_string();
            side.push(suffix);
            let side = PathBuf::from(side);
            if side.exists() {
                std::fs::remove_file(&side)?;
            }
        }
        log::info!(
            "{}",
            "Database deleted.".if_supports_color(Stdout, |t| t.bold()),
        );
        log::info!("  Freed: {:.1} MB", file_size as f64 / (1024.0 * 1024.0));
    } else {
        log::info!("No database found at {}", path.display());
    }

    super::open_at(&path)?;
    log::info!(
        "Created an empty database (schema v{}) at {}",
        CURRENT_VERSION,
        path.display(),
    );
    Ok(())
}
