use super::*;

fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |var| {
        pairs
            .iter()
            .find(|(k, _)| *k == var)
            .map(|(_, v)| v.to_string())
    }
}

fn file_with_key(key: &str) -> ConfigFile {
    ConfigFile {
        api: Some(ApiSection {
            key: Some(key.to_string()),
            host: Some("example.test".to_string()),
            cache_ttl_secs: Some(30),
        }),
        database: Some(DatabaseSection {
            path: Some(PathBuf::from("/tmp/from-file.db")),
        }),
    }
}

#[test]
fn defaults_when_nothing_is_set() {
    let (config, sources) = ApiConfig::resolve(env_from(&[]), None).unwrap();
    assert_eq!(config.api_key, None);
    assert_eq!(config.host, DEFAULT_HOST);
    assert_eq!(config.base_url, "https://cricbuzz-cricket.p.rapidapi.com");
    assert_eq!(config.cache_ttl, Duration::from_secs(600));
    assert_eq!(sources.api_key, ConfigSource::Missing);
    assert_eq!(sources.host, ConfigSource::Default);
    assert_eq!(sources.database_path, ConfigSource::Default);
    assert!(config.require_key().is_err());
}

#[test]
fn config_file_overrides_defaults() {
    let file = file_with_key("file-key");
    let (config, sources) = ApiConfig::resolve(env_from(&[]), Some(&file)).unwrap();
    assert_eq!(config.api_key.as_deref(), Some("file-key"));
    assert_eq!(config.host, "example.test");
    assert_eq!(config.base_url, "https://example.test");
    assert_eq!(config.cache_ttl, Duration::from_secs(30));
    assert_eq!(config.database_path, Some(PathBuf::from("/tmp/from-file.db")));
    assert_eq!(sources.api_key, ConfigSource::ConfigFile);
    assert_eq!(sources.cache_ttl, ConfigSource::ConfigFile);
}

#[test]
fn env_overrides_config_file() {
    let file = file_with_key("file-key");
    let env = env_from(&[
        ("RAPIDAPI_KEY", "env-key"),
        ("CRICSTAT_CACHE_TTL_SECS", "5"),
        ("CRICSTAT_DB", "/tmp/env.db"),
    ]);
    let (config, sources) = ApiConfig::resolve(env, Some(&file)).unwrap();
    assert_eq!(config.require_key().unwrap(), "env-key");
    assert_eq!(config.cache_ttl, Duration::from_secs(5));
    assert_eq!(config.database_path, Some(PathBuf::from("/tmp/env.db")));
    // Host still comes from the file.
    assert_eq!(config.host, "example.test");
    assert_eq!(sources.api_key, ConfigSource::EnvVar("RAPIDAPI_KEY"));
    assert_eq!(sources.host, ConfigSource::ConfigFile);
    assert_eq!(sources.api_key.to_string(), "env $RAPIDAPI_KEY");
}

#[test]
fn blank_env_values_are_ignored() {
    let file = file_with_key("file-key");
    let (config, sources) =
        ApiConfig::resolve(env_from(&[("RAPIDAPI_KEY", "   ")]), Some(&file)).unwrap();
    assert_eq!(config.api_key.as_deref(), Some("file-key"));
    assert_eq!(sources.api_key, ConfigSource::ConfigFile);
}

#[test]
fn invalid_ttl_is_a_config_error() {
    let err = ApiConfig::resolve(env_from(&[("CRICSTAT_CACHE_TTL_SECS", "ten")]), None).unwrap_err();
    assert_eq!(err.category(), crate::error::ErrorCategory::Config);
}

#[test]
fn save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cricstat").join("config.toml");
    let config = ApiConfig {
        api_key: Some("secret-key".to_string()),
        ..ApiConfig::default()
    }
    .with_overrides(None, Some(PathBuf::from("/data/cricket.db")));

    save_to_path(&config, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[api]"));
    assert!(text.contains("[database]"));
    // Defaults are not persisted.
    assert!(!text.contains("host"));
    assert!(!text.contains("cache_ttl_secs"));

    let file = read_config_file(&path).unwrap();
    let (reloaded, _) = ApiConfig::resolve(env_from(&[]), Some(&file)).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn masked_key_shows_last_four() {
    let config = ApiConfig {
        api_key: Some("abcdef123456".to_string()),
        ..ApiConfig::default()
    };
    assert_eq!(config.masked_key().as_deref(), Some("********3456"));
    assert_eq!(ApiConfig::default().masked_key(), None);
}
