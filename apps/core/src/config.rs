use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::monitor::MonitorConfig;

const CONFIG_FILE_NAME: &str = "appsweep.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub poll_interval_secs: u64,
    pub monitor_deadline_secs: u64,
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1,
            monitor_deadline_secs: 600,
            config_path: stable_app_data_dir().join(CONFIG_FILE_NAME),
        }
    }
}

impl Config {
    pub fn monitor(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            deadline: Duration::from_secs(self.monitor_deadline_secs),
        }
    }
}

/// Optional overrides read from `appsweep.toml`; anything absent keeps its
/// default.
#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    poll_interval_secs: Option<u64>,
    monitor_deadline_secs: Option<u64>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "failed to read config: {error}"),
            Self::Parse(error) => write!(f, "failed to parse config: {error}"),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    if let Some(path) = path {
        config.config_path = path;
    }

    if config.config_path.exists() {
        let raw = fs::read_to_string(&config.config_path).map_err(ConfigError::Io)?;
        let overrides: ConfigOverrides = toml::from_str(&raw).map_err(ConfigError::Parse)?;
        if let Some(value) = overrides.poll_interval_secs {
            config.poll_interval_secs = value;
        }
        if let Some(value) = overrides.monitor_deadline_secs {
            config.monitor_deadline_secs = value;
        }
    }

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !(1..=60).contains(&config.poll_interval_secs) {
        return Err(ConfigError::Invalid(
            "poll_interval_secs must be between 1 and 60".to_string(),
        ));
    }

    if !(30..=7200).contains(&config.monitor_deadline_secs) {
        return Err(ConfigError::Invalid(
            "monitor_deadline_secs must be between 30 and 7200".to_string(),
        ));
    }

    if config.monitor_deadline_secs <= config.poll_interval_secs {
        return Err(ConfigError::Invalid(
            "monitor_deadline_secs must exceed poll_interval_secs".to_string(),
        ));
    }

    Ok(())
}

/// Per-user data dir for config and logs; falls back to the temp dir when
/// the platform offers no profile-local location.
pub fn stable_app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LOCALAPPDATA") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir).join("appsweep");
        }
    }
    std::env::temp_dir().join("appsweep")
}
