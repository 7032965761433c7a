//! cricstat CLI
//!
//! Command-line interface for the cricket statistics database: run the
//! analytical query catalog, manage records, and ingest data from Cricbuzz.

mod cli_types;
mod commands;
mod error;
mod logging;
mod spinner;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::cli_types::{Cli, Commands, QueryAction};

pub(crate) use error::CliError;

/// Log an empty line at info level.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("Failed to set up logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        if let Some(hint) = e.hint() {
            log::info!("  {}", hint.if_supports_color(Stdout, |t| t.dimmed()));
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let db = cli.db;
    match cli.command {
        Commands::Query { action } => match action {
            QueryAction::List => {
                commands::query::run_query_list();
                Ok(())
            }
            QueryAction::Run { id, params, output } => {
                commands::query::run_query(db, id, &params, &output)
            }
        },
        Commands::Player { action } => commands::entities::run_player(db, action),
        Commands::Team { action } => commands::entities::run_team(db, action),
        Commands::Venue { action } => commands::entities::run_venue(db, action),
        Commands::Series { action } => commands::entities::run_series(db, action),
        Commands::Match { action } => commands::entities::run_match(db, action),
        Commands::Db { action } => commands::db::run_db(db, action),
        Commands::Refresh {
            feeds,
            rankings,
            teams,
            series,
        } => {
            let options = cricstat_import::RefreshOptions {
                feeds,
                teams,
                series,
                ..Default::default()
            };
            let options = if rankings {
                options.with_all_rankings()
            } else {
                options
            };
            commands::refresh::run_refresh(db, options, cli.quiet, cli.verbose)
        }
        Commands::Fetch { action } => commands::fetch::run_fetch(db, action, cli.quiet),
        Commands::Config { action } => commands::config::run_config(db, action, cli.quiet),
    }
}
