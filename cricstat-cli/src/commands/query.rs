use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cricstat_db::{Query, QueryId, QueryOverrides, Tier};

use crate::CliError;
use crate::cli_types::{OutputArgs, QueryArgs};

use super::output;

/// Print the catalog grouped by tier.
pub(crate) fn run_query_list() {
    let mut current: Option<Tier> = None;
    for id in QueryId::ALL {
        if current != Some(id.tier()) {
            if current.is_some() {
                crate::log_blank();
            }
            current = Some(id.tier());
            log::info!("{}:", id.tier().if_supports_color(Stdout, |t| t.bold()));
        }
        log::info!(
            "  {:<4} {}",
            id.to_string().if_supports_color(Stdout, |t| t.cyan()),
            id.title(),
        );
        log::info!(
            "       {}",
            id.description().if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}

/// Convert command-line parameters into catalog overrides.
pub(crate) fn overrides(params: &QueryArgs) -> QueryOverrides {
    QueryOverrides {
        country: params.country.clone().filter(|c| !c.trim().is_empty()),
        format: params.format,
        year: params.year,
        threshold: params.threshold,
        min_matches: params.min_matches,
        limit: params.limit,
        as_of: params.as_of,
    }
}

/// Run one catalog query and print or export its result.
pub(crate) fn run_query(
    db: Option<PathBuf>,
    id: QueryId,
    params: &QueryArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let today = chrono::Local::now().date_naive();
    let query = Query::defaults(id, today).with_overrides(&overrides(params))?;
    query.validate()?;

    let (conn, _) = super::open_db(db)?;

    log::info!(
        "{} {}",
        id.to_string().if_supports_color(Stdout, |t| t.cyan()),
        id.title().if_supports_color(Stdout, |t| t.bold()),
    );
    log::debug!("Parameters: {:?}", query);

    let table = cricstat_db::run_query_with(&conn, &query, params.strategy.into())?;
    output::emit(&table, output)
}
