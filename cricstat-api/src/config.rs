use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ApiError;

pub const ENV_API_KEY: &str = "RAPIDAPI_KEY";
pub const ENV_API_HOST: &str = "RAPIDAPI_HOST";
pub const ENV_DATABASE: &str = "CRICSTAT_DB";
pub const ENV_CACHE_TTL: &str = "CRICSTAT_CACHE_TTL_SECS";

pub const DEFAULT_HOST: &str = "cricbuzz-cricket.p.rapidapi.com";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Settings for the Cricbuzz client and the default database location.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub host: String,
    /// Base URL requests are sent to. Derived from `host` unless overridden.
    pub base_url: String,
    pub cache_ttl: Duration,
    pub database_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            host: DEFAULT_HOST.to_string(),
            base_url: base_url_for(DEFAULT_HOST),
            cache_ttl: DEFAULT_CACHE_TTL,
            database_path: None,
        }
    }
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Built-in default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    pub api_key: ConfigSource,
    pub host: ConfigSource,
    pub cache_ttl: ConfigSource,
    pub database_path: ConfigSource,
}

/// TOML config file format.
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseSection>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DatabaseSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn base_url_for(host: &str) -> String {
    format!("https://{}", host.trim_end_matches('/'))
}

impl ApiConfig {
    /// Load settings from environment variables and the config file.
    ///
    /// Priority: env vars > config file > built-in defaults.
    pub fn load() -> Result<(Self, ConfigSources), ApiError> {
        let file = load_config_file();
        Self::resolve(|var| std::env::var(var).ok(), file.as_ref())
    }

    /// Resolve settings from an environment lookup and an optional parsed file.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        file: Option<&ConfigFile>,
    ) -> Result<(Self, ConfigSources), ApiError> {
        let env = |var: &str| env(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let api = file.and_then(|f| f.api.as_ref());
        let database = file.and_then(|f| f.database.as_ref());

        let (api_key, api_key_source) = match env(ENV_API_KEY) {
            Some(key) => (Some(key), ConfigSource::EnvVar(ENV_API_KEY)),
            None => match api.and_then(|a| a.key.clone()) {
                Some(key) => (Some(key), ConfigSource::ConfigFile),
                None => (None, ConfigSource::Missing),
            },
        };

        let (host, host_source) = match env(ENV_API_HOST) {
            Some(host) => (host, ConfigSource::EnvVar(ENV_API_HOST)),
            None => match api.and_then(|a| a.host.clone()) {
                Some(host) => (host, ConfigSource::ConfigFile),
                None => (DEFAULT_HOST.to_string(), ConfigSource::Default),
            },
        };

        let (cache_ttl, cache_ttl_source) = match env(ENV_CACHE_TTL) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    ApiError::Config(format!(
                        "{} must be a whole number of seconds, got '{}'",
                        ENV_CACHE_TTL, raw
                    ))
                })?;
                (Duration::from_secs(secs), ConfigSource::EnvVar(ENV_CACHE_TTL))
            }
            None => match api.and_then(|a| a.cache_ttl_secs) {
                Some(secs) => (Duration::from_secs(secs), ConfigSource::ConfigFile),
                None => (DEFAULT_CACHE_TTL, ConfigSource::Default),
            },
        };

        let (database_path, database_source) = match env(ENV_DATABASE) {
            Some(path) => (Some(PathBuf::from(path)), ConfigSource::EnvVar(ENV_DATABASE)),
            None => match database.and_then(|d| d.path.clone()) {
                Some(path) => (Some(path), ConfigSource::ConfigFile),
                None => (None, ConfigSource::Default),
            },
        };

        let config = Self {
            api_key,
            base_url: base_url_for(&host),
            host,
            cache_ttl,
            database_path,
        };
        let sources = ConfigSources {
            api_key: api_key_source,
            host: host_source,
            cache_ttl: cache_ttl_source,
            database_path: database_source,
        };
        Ok((config, sources))
    }

    /// Apply explicit values (e.g., from CLI args).
    pub fn with_overrides(mut self, api_key: Option<String>, database_path: Option<PathBuf>) -> Self {
        if let Some(key) = api_key {
            self.api_key = Some(key);
        }
        if let Some(path) = database_path {
            self.database_path = Some(path);
        }
        self
    }

    /// Point the client at a different base URL, keeping the host header.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The API key, or a configuration error naming where to set it.
    pub fn require_key(&self) -> Result<&str, ApiError> {
        self.api_key.as_deref().ok_or_else(|| {
            ApiError::Config(format!(
                "Missing API key. Set {} env var or add `key` to the [api] section of the config file",
                ENV_API_KEY
            ))
        })
    }

    /// Database path from settings, falling back to the per-user data directory.
    pub fn database_path_or_default(&self) -> Option<PathBuf> {
        self.database_path.clone().or_else(default_database_path)
    }

    /// The key with all but the last four characters masked.
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let count = key.chars().count();
            key.chars()
                .enumerate()
                .map(|(i, c)| if i + 4 < count { '*' } else { c })
                .collect()
        })
    }

    fn to_file(&self) -> ConfigFile {
        let api = ApiSection {
            key: self.api_key.clone(),
            host: (self.host != DEFAULT_HOST).then(|| self.host.clone()),
            cache_ttl_secs: (self.cache_ttl != DEFAULT_CACHE_TTL).then(|| self.cache_ttl.as_secs()),
        };
        ConfigFile {
            api: (api != ApiSection::default()).then_some(api),
            database: self.database_path.clone().map(|path| DatabaseSection { path: Some(path) }),
        }
    }
}

/// Return the path to the config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cricstat").join("config.toml"))
}

/// Default database location under the per-user data directory.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("cricstat").join("cricket.db"))
}

/// Save settings to the config file, creating parent directories as needed.
///
/// Values equal to the built-in defaults are omitted.
/// Returns the path the file was written to.
pub fn save_to_file(config: &ApiConfig) -> Result<PathBuf, ApiError> {
    let path = config_path()
        .ok_or_else(|| ApiError::Config("Could not determine config directory".to_string()))?;
    save_to_path(config, &path)?;
    Ok(path)
}

/// Save settings to an explicit path.
pub fn save_to_path(config: &ApiConfig, path: &Path) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(&config.to_file())
        .map_err(|e| ApiError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Parse a config file at an explicit path.
pub fn read_config_file(path: &Path) -> Result<ConfigFile, ApiError> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| ApiError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

fn load_config_file() -> Option<ConfigFile> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }
    match read_config_file(&path) {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("Ignoring config file: {}", e);
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
