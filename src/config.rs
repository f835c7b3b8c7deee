//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the service looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "JURY_OPTIONS_CONFIG_PATH";
/// How often the authoritative clock is written back when nothing overrides it.
const DEFAULT_CLOCK_BACKUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    clock_backup_interval: Duration,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        clock_backup_secs = app_config.clock_backup_interval.as_secs(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Period of the background clock backup.
    pub fn clock_backup_interval(&self) -> Duration {
        self.clock_backup_interval
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clock_backup_interval: DEFAULT_CLOCK_BACKUP_INTERVAL,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    clock_backup_interval_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let clock_backup_interval = match value.clock_backup_interval_secs {
            Some(0) => {
                warn!("clock backup interval must be positive; using default");
                DEFAULT_CLOCK_BACKUP_INTERVAL
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_CLOCK_BACKUP_INTERVAL,
        };
        Self {
            clock_backup_interval,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AppConfig {
        serde_json::from_str::<RawConfig>(json).unwrap().into()
    }

    #[test]
    fn interval_is_read_from_file() {
        assert_eq!(
            parse(r#"{"clock_backup_interval_secs": 30}"#).clock_backup_interval(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn missing_or_zero_interval_uses_default() {
        assert_eq!(parse("{}"), AppConfig::default());
        assert_eq!(
            parse(r#"{"clock_backup_interval_secs": 0}"#),
            AppConfig::default()
        );
    }
}
