use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use tracker_engine::{ServiceSettings, TrackerSettings};

use crate::logging::{LogDestination, DEFAULT_LOG_FILE};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "tracker.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub auto_dismiss_ms: u64,
    /// Periodic full refresh; 0 turns it off.
    pub refresh_interval_secs: u64,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let service = ServiceSettings::default();
        let tracker = TrackerSettings::default();
        Self {
            api_base_url: service.base_url,
            poll_interval_ms: tracker.poll_interval.as_millis() as u64,
            auto_dismiss_ms: tracker.auto_dismiss_after.as_millis() as u64,
            refresh_interval_secs: 30,
            log_destination: LogDestination::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads a RON config file. A missing file yields defaults unless
    /// `required` is set.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()));
            }
        };
        ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            base_url: self.api_base_url.clone(),
            ..ServiceSettings::default()
        }
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            auto_dismiss_after: Duration::from_millis(self.auto_dismiss_ms),
        }
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| anyhow!("unknown log level {:?}", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_optional_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("absent.ron"), false).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tracker_settings().poll_interval, Duration::from_millis(2000));
        assert_eq!(
            config.tracker_settings().auto_dismiss_after,
            Duration::from_millis(10_000)
        );
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(AppConfig::load(&temp.path().join("absent.ron"), true).is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tracker.ron");
        fs::write(
            &path,
            r#"(api_base_url: "http://search.internal/api", refresh_interval_secs: 0, log_destination: Both)"#,
        )
        .unwrap();

        let config = AppConfig::load(&path, true).unwrap();
        assert_eq!(config.api_base_url, "http://search.internal/api");
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(config.service_settings().base_url, "http://search.internal/api");
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tracker.ron");
        fs::write(&path, "(poll_interval_ms: \"fast\")").unwrap();

        let err = AppConfig::load(&path, true).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn log_level_is_parsed() {
        let config = AppConfig {
            log_level: "debug".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);

        let bad = AppConfig {
            log_level: "loud".to_string(),
            ..AppConfig::default()
        };
        assert!(bad.level_filter().is_err());
    }
}
