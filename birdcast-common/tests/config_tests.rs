//! Config file loading and priority resolution

use birdcast_common::config::{
    CliOverrides, Settings, TomlConfig, BIND_ENV, CACHE_DIR_ENV, CONFIG_ENV, PORT_ENV,
};
use serial_test::serial;
use std::path::PathBuf;

fn clear_env() {
    for name in [CONFIG_ENV, BIND_ENV, PORT_ENV, CACHE_DIR_ENV] {
        std::env::remove_var(name);
    }
}

const SAMPLE: &str = r#"
[server]
bind = "127.0.0.1"
port = 6000

[models]
cache_dir = "/var/cache/birdcast"
presence_url = "http://models.local/presence.json"

[logging]
level = "debug"
"#;

#[test]
#[serial]
fn test_load_explicit_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config.server.port, 6000);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.models.presence_url.as_deref(), Some("http://models.local/presence.json"));
    assert!(config.models.location_url.is_none());
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = TomlConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_malformed_file_is_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();
    assert!(TomlConfig::load(Some(&path)).is_err());
}

#[test]
#[serial]
fn test_config_path_from_env() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("env.toml");
    std::fs::write(&path, "[server]\nport = 7100\n").unwrap();
    std::env::set_var(CONFIG_ENV, &path);

    let config = TomlConfig::load(None).unwrap();
    assert_eq!(config.server.port, 7100);
    clear_env();
}

#[test]
#[serial]
fn test_priority_cli_then_env_then_toml() {
    clear_env();
    let toml: TomlConfig = toml::from_str(SAMPLE).unwrap();

    // TOML only
    let settings = Settings::resolve(CliOverrides::default(), toml.clone()).unwrap();
    assert_eq!(settings.bind, "127.0.0.1");
    assert_eq!(settings.port, 6000);
    assert_eq!(settings.cache_dir, PathBuf::from("/var/cache/birdcast"));
    assert_eq!(settings.log_level, "debug");

    // Env beats TOML
    std::env::set_var(PORT_ENV, "6100");
    std::env::set_var(CACHE_DIR_ENV, "/tmp/env-cache");
    let settings = Settings::resolve(CliOverrides::default(), toml.clone()).unwrap();
    assert_eq!(settings.port, 6100);
    assert_eq!(settings.cache_dir, PathBuf::from("/tmp/env-cache"));
    assert_eq!(settings.presence.path, PathBuf::from("/tmp/env-cache/presence_model.json"));

    // CLI beats env
    let cli = CliOverrides {
        port: Some(6200),
        ..Default::default()
    };
    let settings = Settings::resolve(cli, toml).unwrap();
    assert_eq!(settings.port, 6200);
    assert_eq!(
        settings.presence.url.as_deref(),
        Some("http://models.local/presence.json")
    );
    clear_env();
}

#[test]
#[serial]
fn test_invalid_port_env_is_error() {
    clear_env();
    std::env::set_var(PORT_ENV, "not-a-port");
    let result = Settings::resolve(CliOverrides::default(), TomlConfig::default());
    clear_env();
    assert!(result.is_err());
}
