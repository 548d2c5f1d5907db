//! Tests for the `taskdeck-config` loader covering defaults, file
//! discovery, and environment overrides.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use taskdeck_config::{load, AppConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "TASKDECK_CONFIG",
    "TASKDECK__HTTP__ADDRESS",
    "TASKDECK__HTTP__PORT",
    "TASKDECK__HTTP__PUBLIC_URL",
    "TASKDECK__DATABASE__URL",
    "TASKDECK__DATABASE__MAX_CONNECTIONS",
    "TASKDECK__AUTH__SESSION_TTL_SECONDS",
    "TASKDECK__MAIL__API_KEY",
    "TASKDECK__MAIL__BASE_URL",
    "TASKDECK__MAIL__FROM",
    "TASKDECK__MAIL__REQUEST_TIMEOUT_SECONDS",
];

fn reset_environment() {
    for key in ENV_VARS_TO_RESET {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn load_falls_back_to_defaults() {
    reset_environment();

    let config = load().expect("defaults should load");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(config.auth.session_ttl_seconds, 86_400);
    assert!(!config.mail.enabled());
}

#[test]
#[serial]
fn load_reads_file_from_taskdeck_config_env() {
    reset_environment();

    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("taskdeck.toml");
    fs::write(
        &path,
        r#"
[http]
port = 9191

[mail]
api_key = "file-key"
from = "alerts@example.com"
"#,
    )
    .expect("write config file");

    std::env::set_var("TASKDECK_CONFIG", &path);
    let config = load().expect("file config should load");
    std::env::remove_var("TASKDECK_CONFIG");

    assert_eq!(config.http.port, 9191);
    assert!(config.mail.enabled());
    assert_eq!(config.mail.from, "alerts@example.com");
    // Untouched sections keep their defaults.
    assert_eq!(config.database.max_connections, 10);
}

#[test]
#[serial]
fn environment_overrides_take_precedence() {
    reset_environment();

    std::env::set_var("TASKDECK__DATABASE__URL", "sqlite://override.db");
    std::env::set_var("TASKDECK__MAIL__REQUEST_TIMEOUT_SECONDS", "3");

    let config = load().expect("env overrides should load");

    std::env::remove_var("TASKDECK__DATABASE__URL");
    std::env::remove_var("TASKDECK__MAIL__REQUEST_TIMEOUT_SECONDS");

    assert_eq!(config.database.url, "sqlite://override.db");
    assert_eq!(config.mail.request_timeout_seconds, 3);
}
