use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            database: DatabaseConfig::default(),
            generation: GenerationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to `~/.codepassport/data/codepassport.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(crate::db::default_database_path)
    }
}

/// Timing of the generation worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Pause between two poll cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// First backoff delay after an unexpected worker failure.
    #[serde(default = "default_retry_delay_minutes")]
    pub retry_delay_minutes: u64,
    /// Upper bound for the backoff delay.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_retry_delay_minutes() -> u64 {
    1
}

fn default_max_backoff_secs() -> u64 {
    3600
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            retry_delay_minutes: default_retry_delay_minutes(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_minutes.saturating_mul(60))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_defaults() {
        let generation = GenerationConfig::default();
        assert_eq!(generation.poll_interval(), Duration::from_secs(30));
        assert_eq!(generation.retry_delay(), Duration::from_secs(60));
        assert_eq!(generation.max_backoff(), Duration::from_secs(3600));
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.generation, GenerationConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_database_path_falls_back_to_default() {
        let config = DatabaseConfig::default();
        let path = config.resolved_path().unwrap();
        assert!(path.ends_with("codepassport.db"));

        let explicit = DatabaseConfig {
            path: Some(PathBuf::from("/var/lib/codepassport/db.sqlite")),
        };
        assert_eq!(
            explicit.resolved_path().unwrap(),
            PathBuf::from("/var/lib/codepassport/db.sqlite")
        );
    }
}
