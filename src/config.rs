use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::SelectionStrategy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub cors: CorsSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_acquire_timeout_secs() -> u64 { 5 }
fn default_idle_timeout_secs() -> u64 { 600 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub strategy: SelectionStrategy,
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::default(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u32 { 10 }
fn default_max_limit() -> u32 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
        }
    }
}

fn default_allowed_origin() -> String { "http://localhost:3000".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "plain".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RIDE__), e.g. RIDE__SERVER__PORT -> server.port
    /// 5. DATABASE_URL and PORT
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }
}

impl MatchingSettings {
    /// Requested limit, or the default, capped at `max_limit`
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
            .max(1)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("RIDE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Conventional deployment variables take precedence over everything else
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<i64>().ok()) {
        builder = builder.set_override("server.port", port)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.strategy, SelectionStrategy::Pushdown);
        assert_eq!(matching.default_limit, 10);
        assert_eq!(matching.max_limit, 100);
    }

    #[test]
    fn test_effective_limit() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.effective_limit(None), 10);
        assert_eq!(matching.effective_limit(Some(25)), 25);
        assert_eq!(matching.effective_limit(Some(500)), 100);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "plain");
    }

    #[test]
    fn test_deserialize_minimal() {
        let settings: Settings = Config::builder()
            .set_override("database.url", "postgres://localhost/ride_match")
            .unwrap()
            .set_override("matching.strategy", "bounding_box")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.database.url, "postgres://localhost/ride_match");
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.matching.strategy, SelectionStrategy::BoundingBox);
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_load_from_applies_env_overrides() {
        let path = std::env::temp_dir().join(format!("ride-match-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[server]\nport = 8080\n\n[database]\nurl = \"postgres://file/ride_match\"\n",
        )
        .unwrap();

        std::env::set_var("DATABASE_URL", "postgres://env/ride_match");
        std::env::set_var("PORT", "9090");
        let loaded = Settings::load_from(&path);
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("PORT");
        std::fs::remove_file(&path).ok();

        let settings = loaded.unwrap();
        assert_eq!(settings.database.url, "postgres://env/ride_match");
        assert_eq!(settings.server.port, 9090);
    }
}
