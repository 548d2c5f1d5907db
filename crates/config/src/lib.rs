use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "taskdeck.toml",
    "config/taskdeck.toml",
    "../taskdeck.toml",
    "../config/taskdeck.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
    /// Base URL used when rendering links in outbound email.
    pub public_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7080,
            public_url: "http://localhost:7080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://taskdeck.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: 86_400,
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Settings for the outbound HTTP mail API. Mail delivery is disabled
/// unless an API key is configured.
///
/// ```
/// use taskdeck_config::MailConfig;
///
/// let mail = MailConfig::default();
/// assert!(!mail.enabled());
/// assert_eq!(mail.request_timeout_seconds, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "MailConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "MailConfig::default_from")]
    pub from: String,
    #[serde(default = "MailConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl MailConfig {
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn default_base_url() -> String {
        "https://mail.taskdeck.dev/v1".to_string()
    }

    fn default_from() -> String {
        "noreply@taskdeck.dev".to_string()
    }

    const fn default_request_timeout() -> u64 {
        10
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            from: Self::default_from(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Load the application configuration by combining defaults, an optional
/// configuration file, and environment overrides.
///
/// ```
/// use taskdeck_config::load;
///
/// std::env::remove_var("TASKDECK_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("http.public_url", defaults.http.public_url.clone())
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default(
            "auth.session_ttl_seconds",
            i64::try_from(defaults.auth.session_ttl_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default("mail.base_url", defaults.mail.base_url.clone())
        .unwrap()
        .set_default("mail.from", defaults.mail.from.clone())
        .unwrap()
        .set_default(
            "mail.request_timeout_seconds",
            i64::try_from(defaults.mail.request_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap();

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("TASKDECK_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via TASKDECK_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix("TASKDECK").separator("__"));

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
