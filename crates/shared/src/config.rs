//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Persistence configuration.
    pub persistence: PersistenceConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Which snapshot store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    /// Local JSON file (offline fallback).
    File,
    /// Hosted Postgres database.
    Postgres,
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Snapshot store backend.
    #[serde(default = "default_backend")]
    pub backend: PersistenceBackend,
    /// Path of the local snapshot file (file backend).
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Database connection URL (postgres backend).
    pub database_url: Option<String>,
}

const fn default_backend() -> PersistenceBackend {
    PersistenceBackend::File
}

fn default_snapshot_path() -> String {
    "data/ledger.json".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("WARUNG").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
