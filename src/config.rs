use std::collections::HashMap;
use thiserror::Error;

/// Runtime configuration, loaded from the environment.
///
/// `epoch_pad_width` and `base_window_hours` must match the values used to
/// write the existing balance data; a mismatched pad width silently
/// misorders sort-key comparisons.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Zero-pad width W for the epoch segment of composite sort keys.
    pub epoch_pad_width: usize,
    /// Base window size, in hours, for continuation-mode widening.
    pub base_window_hours: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let epoch_pad_width = env_map
            .get("EPOCH_PAD_WIDTH")
            .map(|s| s.as_str())
            .unwrap_or("5")
            .parse::<usize>()
            .ok()
            .filter(|w| (1..=19).contains(w))
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "EPOCH_PAD_WIDTH".to_string(),
                    "must be an integer between 1 and 19".to_string(),
                )
            })?;

        let base_window_hours = env_map
            .get("BASE_WINDOW_HOURS")
            .map(|s| s.as_str())
            .unwrap_or("8")
            .parse::<i64>()
            .ok()
            .filter(|h| *h > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "BASE_WINDOW_HOURS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            epoch_pad_width,
            base_window_hours,
        })
    }
}
