//! Runtime configuration read from `FFTSCOPE_*` environment variables
//!
//! A `.env` file in the working directory is loaded by the binaries before
//! anything here runs. Every value has a default, so an empty environment
//! gives a dashboard pointed at a broker on localhost.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use fftscope_core::session::DEFAULT_STALE_AFTER_SECS;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const ENV_BROKER_HOST: &str = "FFTSCOPE_BROKER_HOST";
pub const ENV_BROKER_PORT: &str = "FFTSCOPE_BROKER_PORT";
pub const ENV_USERNAME: &str = "FFTSCOPE_USERNAME";
pub const ENV_PASSWORD: &str = "FFTSCOPE_PASSWORD";
pub const ENV_CLIENT_ID: &str = "FFTSCOPE_CLIENT_ID";
pub const ENV_KEEP_ALIVE_SECS: &str = "FFTSCOPE_KEEP_ALIVE_SECS";
pub const ENV_TICK_MS: &str = "FFTSCOPE_TICK_MS";
pub const ENV_STALE_SECS: &str = "FFTSCOPE_STALE_SECS";
pub const ENV_EXPORT_DIR: &str = "FFTSCOPE_EXPORT_DIR";

/// Broker connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1883,
            username: None,
            password: None,
            client_id: "fftscope".into(),
            keep_alive_secs: 60,
        }
    }
}

impl BrokerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let get = |key: &str| non_blank(lookup(key));

        Ok(Self {
            host: get(ENV_BROKER_HOST).unwrap_or(defaults.host),
            port: parse_or(ENV_BROKER_PORT, get(ENV_BROKER_PORT), defaults.port)?,
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD),
            client_id: get(ENV_CLIENT_ID).unwrap_or(defaults.client_id),
            keep_alive_secs: parse_or(
                ENV_KEEP_ALIVE_SECS,
                get(ENV_KEEP_ALIVE_SECS),
                defaults.keep_alive_secs,
            )?,
        })
    }

    /// Username and password, only when both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

/// Render loop and console settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Interval between aggregator ticks
    pub tick_ms: u64,
    /// Seconds without a message before the feed counts as stale
    pub stale_secs: i64,
    /// Directory for CSV exports and screenshots
    pub export_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            stale_secs: DEFAULT_STALE_AFTER_SECS,
            export_dir: PathBuf::from("."),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let get = |key: &str| non_blank(lookup(key));

        let tick_ms = parse_or(ENV_TICK_MS, get(ENV_TICK_MS), defaults.tick_ms)?;
        if tick_ms == 0 {
            return Err(AppError::Config {
                key: ENV_TICK_MS,
                value: "0".into(),
            });
        }

        let stale_secs = parse_or(ENV_STALE_SECS, get(ENV_STALE_SECS), defaults.stale_secs)?;
        if stale_secs <= 0 {
            return Err(AppError::Config {
                key: ENV_STALE_SECS,
                value: stale_secs.to_string(),
            });
        }

        Ok(Self {
            tick_ms,
            stale_secs,
            export_dir: get(ENV_EXPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn stale_after(&self) -> TimeDelta {
        TimeDelta::seconds(self.stale_secs)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, AppError> {
    match value {
        Some(raw) => raw.parse().map_err(|_| AppError::Config { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let broker = BrokerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(broker, BrokerConfig::default());
        assert_eq!(broker.credentials(), None);

        let dashboard = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(dashboard.tick_interval(), Duration::from_secs(1));
        assert_eq!(dashboard.stale_after(), TimeDelta::seconds(30));
    }

    #[test]
    fn test_broker_from_environment() {
        let broker = BrokerConfig::from_lookup(lookup(&[
            (ENV_BROKER_HOST, " 192.168.0.103 "),
            (ENV_BROKER_PORT, "1884"),
            (ENV_USERNAME, "admin"),
            (ENV_PASSWORD, "secret"),
            (ENV_KEEP_ALIVE_SECS, "30"),
        ]))
        .unwrap();

        assert_eq!(broker.host, "192.168.0.103");
        assert_eq!(broker.port, 1884);
        assert_eq!(broker.credentials(), Some(("admin", "secret")));
        assert_eq!(broker.keep_alive(), Duration::from_secs(30));
        assert_eq!(broker.client_id, "fftscope");
    }

    #[test]
    fn test_credentials_need_both_halves() {
        let broker = BrokerConfig::from_lookup(lookup(&[(ENV_USERNAME, "admin")])).unwrap();
        assert_eq!(broker.credentials(), None);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = BrokerConfig::from_lookup(lookup(&[(ENV_BROKER_PORT, "70000")])).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config { key: ENV_BROKER_PORT, ref value } if value == "70000"
        ));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let broker = BrokerConfig::from_lookup(lookup(&[(ENV_BROKER_HOST, "   ")])).unwrap();
        assert_eq!(broker.host, "localhost");
    }

    #[test]
    fn test_dashboard_rejects_zero_tick() {
        let err = DashboardConfig::from_lookup(lookup(&[(ENV_TICK_MS, "0")])).unwrap_err();
        assert!(matches!(err, AppError::Config { key: ENV_TICK_MS, .. }));
    }

    #[test]
    fn test_dashboard_export_dir() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (ENV_EXPORT_DIR, "/tmp/fft"),
            (ENV_STALE_SECS, "45"),
        ]))
        .unwrap();
        assert_eq!(config.export_dir, PathBuf::from("/tmp/fft"));
        assert_eq!(config.stale_after(), TimeDelta::seconds(45));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let broker = BrokerConfig {
            password: Some("secret".into()),
            ..BrokerConfig::default()
        };
        let json = serde_json::to_string(&broker).unwrap();
        assert!(!json.contains("secret"));
    }
}
