use qcforms_db_postgres::PostgresConfig;
use qcforms_reconciler::ReconcilerOptions;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Reconciler behavior shared by all forms
    #[serde(default)]
    pub forms: FormsConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(format!("logging.level is not a valid filter: {}", self.logging.level));
        }
        if self.storage.backend == StorageBackend::Postgres {
            let pg = &self.storage.postgres;
            if pg.url.trim().is_empty() {
                return Err("storage.postgres.url must be set for the postgres backend".into());
            }
            if pg.pool_size == 0 {
                return Err("storage.postgres.pool_size must be > 0".into());
            }
            if pg.connect_timeout_ms == 0 {
                return Err("storage.postgres.connect_timeout_ms must be > 0".into());
            }
        }
        Ok(())
    }

    pub fn reconciler_options(&self) -> ReconcilerOptions {
        ReconcilerOptions {
            optimistic_concurrency: self.forms.optimistic_concurrency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local store; nothing survives the process
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "warn".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormsConfig {
    /// Reject updates when the stored row changed since it was loaded
    #[serde(default)]
    pub optimistic_concurrency: bool,
}

/// Where the configuration path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CliArgument,
    EnvironmentVariable,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (QCFORMS_CONFIG)"),
            Self::Default => write!(f, "default (qcforms.toml)"),
        }
    }
}

/// Picks the config file: `--config`, then `QCFORMS_CONFIG`, then `qcforms.toml`.
pub fn resolve_config_path(cli_path: Option<&str>) -> (String, ConfigSource) {
    if let Some(path) = cli_path.filter(|p| !p.is_empty()) {
        return (path.to_string(), ConfigSource::CliArgument);
    }
    if let Ok(path) = std::env::var("QCFORMS_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }
    ("qcforms.toml".to_string(), ConfigSource::Default)
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads the optional TOML file, then `QCFORMS__SECTION__KEY` overrides.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or("qcforms.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., QCFORMS__STORAGE__BACKEND=postgres
        builder = builder.add_source(
            Environment::with_prefix("QCFORMS")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
