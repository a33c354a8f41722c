//! Configuration resolution and graceful degradation
//!
//! Tests that touch SHELF_* environment variables are marked #[serial] so they
//! never race each other.

use serde::Deserialize;
use serial_test::serial;
use shelf_common::config::{
    load_toml_config, resolve_config_path, CacheConfig, FetcherConfig, CONFIG_ENV_VAR,
    REDIS_URL_ENV_VAR,
};
use shelf_common::Error;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SampleConfig {
    cache: CacheConfig,
    fetcher: FetcherConfig,
}

#[test]
#[serial]
fn test_cli_path_wins_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")), "shelf-md");
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None, "shelf-md");
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_no_file_means_defaults() {
    let config: SampleConfig = load_toml_config(None).unwrap();
    assert_eq!(config.cache, CacheConfig::default());
    assert_eq!(config.fetcher, FetcherConfig::default());
}

#[test]
fn test_missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config: SampleConfig = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.cache, CacheConfig::default());
}

#[test]
fn test_file_values_override_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[cache]
short_ttl_secs = 120

[fetcher]
max_concurrent = 5
"#
    )
    .unwrap();

    let config: SampleConfig = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.cache.short_ttl_secs, 120);
    assert_eq!(config.cache.long_ttl_secs, CacheConfig::default().long_ttl_secs);
    assert_eq!(config.fetcher.max_concurrent, 5);
    assert_eq!(config.fetcher.min_spacing_ms, 200);
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[cache\nshort_ttl_secs = ").unwrap();

    let err = load_toml_config::<SampleConfig>(Some(file.path())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_redis_url_env_override() {
    env::set_var(REDIS_URL_ENV_VAR, "redis://cache:6379");

    let mut cache = CacheConfig::default();
    cache.apply_env();
    assert_eq!(cache.redis_url.as_deref(), Some("redis://cache:6379"));

    env::remove_var(REDIS_URL_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_is_ignored() {
    env::set_var(REDIS_URL_ENV_VAR, "   ");

    let mut cache = CacheConfig::default();
    cache.apply_env();
    assert_eq!(cache.redis_url, None);

    env::remove_var(REDIS_URL_ENV_VAR);
}
