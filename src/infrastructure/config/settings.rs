use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Directory with a built single-page frontend, served as fallback
    #[serde(default)]
    pub static_dir: Option<String>,
}

/// PostgreSQL pool and startup connectivity settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Maximum number of pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Idle connections older than this are closed
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    /// Maximum wait for a free connection
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    /// libpq-style sslmode (`disable`, `prefer`, `require`, `verify-ca`, `verify-full`).
    /// `require` encrypts without verifying the server certificate.
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Startup connectivity retry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Jitter factor (0.0 to 1.0); zero keeps delays exact
    #[serde(default)]
    pub jitter_factor: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_pool_size() -> u32 {
    3
}

fn default_idle_timeout_ms() -> u64 {
    30_000
}

fn default_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_ssl_mode() -> String {
    "require".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "entries-service".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("database.pool_size", default_pool_size())?
            .set_default("database.idle_timeout_ms", default_idle_timeout_ms())?
            .set_default("database.acquire_timeout_ms", default_acquire_timeout_ms())?
            .set_default("database.ssl_mode", default_ssl_mode())?
            .set_default("database.retry.max_attempts", default_max_attempts())?
            .set_default("database.retry.initial_delay_ms", default_initial_delay_ms())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Nested keys from the environment: DATABASE__POOL_SIZE, SERVER__PORT, ...
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            // Conventional single-word variables win over everything else
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?;

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DatabaseConfig {
    /// Settings for `url` with every other field at its default.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: default_pool_size(),
            idle_timeout_ms: default_idle_timeout_ms(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            ssl_mode: default_ssl_mode(),
            retry: RetryConfig::default(),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            static_dir: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter_factor: 0.0,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 3001);
        assert!(server.static_dir.is_none());
    }

    #[test]
    fn test_database_defaults() {
        let db = DatabaseConfig::with_url("postgres://localhost/entries");
        assert_eq!(db.pool_size, 3);
        assert_eq!(db.idle_timeout(), Duration::from_secs(30));
        assert_eq!(db.acquire_timeout(), Duration::from_secs(5));
        assert_eq!(db.ssl_mode, "require");
        assert_eq!(db.retry.max_attempts, 5);
        assert_eq!(db.retry.initial_delay_ms, 1000);
        assert_eq!(db.retry.jitter_factor, 0.0);
    }

    #[test]
    fn test_deserialize_partial_database_section() {
        let settings: Settings = Config::builder()
            .set_override("database.url", "postgres://db/entries")
            .unwrap()
            .set_override("database.retry.max_attempts", 2)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.database.url, "postgres://db/entries");
        assert_eq!(settings.database.retry.max_attempts, 2);
        assert_eq!(settings.database.retry.initial_delay_ms, 1000);
        assert_eq!(settings.database.pool_size, 3);
        assert_eq!(settings.server.port, 3001);
        assert!(!settings.otel.enabled);
    }

    #[test]
    fn test_env_overrides_nested_keys() {
        env::set_var("DATABASE_URL", "postgres://env-host/entries");
        env::set_var("DATABASE__SSL_MODE", "disable");
        env::set_var("SERVER__HOST", "127.0.0.1");
        env::set_var("SERVER__CORS_ORIGINS", "http://a.test,http://b.test");

        let result = Settings::new();

        for key in [
            "DATABASE_URL",
            "DATABASE__SSL_MODE",
            "SERVER__HOST",
            "SERVER__CORS_ORIGINS",
        ] {
            env::remove_var(key);
        }

        let settings = result.unwrap();
        assert_eq!(settings.database.url, "postgres://env-host/entries");
        assert_eq!(settings.database.ssl_mode, "disable");
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(
            settings.server.cors_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                ..ServerConfig::default()
            },
            database: DatabaseConfig::with_url("postgres://localhost/entries"),
            otel: OtelConfig::default(),
        };
        assert_eq!(settings.server_addr(), "127.0.0.1:8080");
    }
}
