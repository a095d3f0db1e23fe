use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::schema::{Config, LogFormat};
use crate::error::ConfigError;

/// Prefix shared by all environment overrides.
pub const ENV_PREFIX: &str = "CODEPASSPORT_";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

impl Config {
    /// Applies `CODEPASSPORT_*` variables from the process environment and
    /// re-validates the result.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides using `lookup` to resolve variable names.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            let name = format!("{}{}", ENV_PREFIX, suffix);
            lookup(&name).map(|value| (name, value))
        };

        if let Some((_, value)) = var("DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(value));
        }
        if let Some((name, value)) = var("POLL_INTERVAL_SECS") {
            self.generation.poll_interval_secs = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("RETRY_DELAY_MINUTES") {
            self.generation.retry_delay_minutes = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("MAX_BACKOFF_SECS") {
            self.generation.max_backoff_secs = parse_env(&name, &value)?;
        }
        if let Some((_, value)) = var("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some((name, value)) = var("LOG_FORMAT") {
            self.logging.format = match value.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::InvalidEnv { name, value }),
            };
        }

        validate_config(self)
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let generation = &config.generation;
    if generation.poll_interval_secs == 0 {
        return Err(ConfigError::Validation {
            message: "generation.poll_interval_secs must be greater than zero".to_string(),
        });
    }
    if generation.retry_delay_minutes == 0 {
        return Err(ConfigError::Validation {
            message: "generation.retry_delay_minutes must be greater than zero".to_string(),
        });
    }
    if generation.retry_delay() > generation.max_backoff() {
        return Err(ConfigError::Validation {
            message: format!(
                "generation.retry_delay_minutes ({} min) exceeds max_backoff_secs ({} s)",
                generation.retry_delay_minutes, generation.max_backoff_secs
            ),
        });
    }

    if config.logging.level.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "logging.level must not be empty".to_string(),
        });
    }

    Ok(())
}
