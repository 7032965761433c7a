use std::path::PathBuf;
use std::time::Duration;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cricstat_api::{ApiConfig, CricbuzzClient};

use crate::CliError;
use crate::cli_types::ConfigAction;
use crate::spinner;

pub(crate) fn run_config(
    db: Option<PathBuf>,
    action: ConfigAction,
    quiet: bool,
) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => run_config_show(db),
        ConfigAction::Set {
            key,
            host,
            cache_ttl,
            database,
        } => run_config_set(key, host, cache_ttl, database),
        ConfigAction::Test => run_config_test(db, quiet),
        ConfigAction::Path => run_config_path(),
    }
}

fn print_setting(name: &str, value: Option<String>, source: &str) {
    let source_str = format!("({})", source);
    match value {
        Some(v) => {
            log::info!(
                "  {} {} {}",
                format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                v,
                source_str.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  {} {} {}",
                format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                "not set".if_supports_color(Stdout, |t| t.yellow()),
                source_str.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }
}

/// Show current settings and their sources.
fn run_config_show(db: Option<PathBuf>) -> Result<(), CliError> {
    let path = cricstat_api::config_path();
    let (config, sources) = ApiConfig::load()?;

    log::info!(
        "{}",
        "cricstat Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    crate::log_blank();

    print_setting("api_key", config.masked_key(), &sources.api_key.to_string());
    print_setting("host", Some(config.host.clone()), &sources.host.to_string());
    print_setting(
        "cache_ttl",
        Some(format!("{}s", config.cache_ttl.as_secs())),
        &sources.cache_ttl.to_string(),
    );

    let database_source = if db.is_some() {
        "--db".to_string()
    } else {
        sources.database_path.to_string()
    };
    let database = config
        .with_overrides(None, db)
        .database_path_or_default()
        .map(|p| p.display().to_string());
    print_setting("database", database, &database_source);
    Ok(())
}

/// Merge the given values into the saved config file.
fn run_config_set(
    key: Option<String>,
    host: Option<String>,
    cache_ttl: Option<u64>,
    database: Option<PathBuf>,
) -> Result<(), CliError> {
    if key.is_none() && host.is_none() && cache_ttl.is_none() && database.is_none() {
        return Err(CliError::invalid(
            "nothing to set; pass --key, --host, --cache-ttl or --database",
        ));
    }

    // Start from the file alone so environment overrides are not persisted.
    let file = match cricstat_api::config_path() {
        Some(p) if p.exists() => Some(cricstat_api::read_config_file(&p)?),
        _ => None,
    };
    let (mut config, _) = ApiConfig::resolve(|_| None, file.as_ref())?;

    if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key.trim().to_string());
    }
    if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
        config.host = host.trim().to_string();
    }
    if let Some(secs) = cache_ttl {
        config.cache_ttl = Duration::from_secs(secs);
    }
    if let Some(path) = database {
        config.database_path = Some(path);
    }

    let path = cricstat_api::save_to_file(&config)?;
    log::info!(
        "{} {}",
        "Saved settings to".if_supports_color(Stdout, |t| t.bold()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

/// Test the API key with a cheap request.
fn run_config_test(db: Option<PathBuf>, quiet: bool) -> Result<(), CliError> {
    let (config, _) = super::load_config(db)?;
    let client = CricbuzzClient::new(&config)?;
    let rt = super::runtime()?;

    let pb = spinner::spinner(format!("Connecting to {}...", config.host), quiet);
    let result = rt.block_on(client.check_connection());
    pb.finish_and_clear();

    match result {
        Ok(count) => {
            log::info!(
                "{} Connected to {} ({} recent match(es) listed)",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                config.host.if_supports_color(Stdout, |t| t.bold()),
                count,
            );
            Ok(())
        }
        Err(e) => {
            log::warn!(
                "{} Connection test failed ({} error)",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e.category(),
            );
            Err(e.into())
        }
    }
}

fn run_config_path() -> Result<(), CliError> {
    match cricstat_api::config_path() {
        Some(p) => {
            log::info!("{}", p.display());
            Ok(())
        }
        None => Err(CliError::config("could not determine config directory")),
    }
}
