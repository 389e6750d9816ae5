//! Gateway configuration
//!
//! Read once at startup from `MATCH_*` environment variables. Unset variables
//! fall back to defaults; a value that does not parse, or a zero where a
//! positive number is required, stops the process before it binds.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use matchmaker::MatchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },

    #[error("Invalid bind address: {0}")]
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub forming_timeout_secs: u64,
    pub intake_capacity: usize,
    pub outbound_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            forming_timeout_secs: 10,
            intake_capacity: 1,
            outbound_capacity: 64,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("MATCH_HOST").unwrap_or(defaults.host),
            port: positive(&lookup, "MATCH_PORT", defaults.port)?,
            forming_timeout_secs: positive(
                &lookup,
                "MATCH_FORMING_TIMEOUT_SECS",
                defaults.forming_timeout_secs,
            )?,
            intake_capacity: positive(&lookup, "MATCH_INTAKE_CAPACITY", defaults.intake_capacity)?,
            outbound_capacity: positive(
                &lookup,
                "MATCH_OUTBOUND_CAPACITY",
                defaults.outbound_capacity,
            )?,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            forming_timeout: Duration::from_secs(self.forming_timeout_secs),
            intake_capacity: self.intake_capacity,
            outbound_capacity: self.outbound_capacity,
        }
    }
}

fn positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { key, value: raw.clone() })?;
    if value == T::default() {
        return Err(ConfigError::Zero { key });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
        assert_eq!(config.match_config().forming_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("MATCH_HOST", "127.0.0.1"),
            ("MATCH_PORT", "8080"),
            ("MATCH_FORMING_TIMEOUT_SECS", "30"),
            ("MATCH_OUTBOUND_CAPACITY", " 16 "),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        let matching = config.match_config();
        assert_eq!(matching.forming_timeout, Duration::from_secs(30));
        assert_eq!(matching.intake_capacity, 1);
        assert_eq!(matching.outbound_capacity, 16);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            GatewayConfig::from_lookup(lookup(&[("MATCH_PORT", "http")])).unwrap_err(),
            ConfigError::Invalid {
                key: "MATCH_PORT",
                value: "http".to_string()
            }
        );
        assert_eq!(
            GatewayConfig::from_lookup(lookup(&[("MATCH_FORMING_TIMEOUT_SECS", "0")])).unwrap_err(),
            ConfigError::Zero {
                key: "MATCH_FORMING_TIMEOUT_SECS"
            }
        );
    }

    #[test]
    fn test_bad_host() {
        let config = GatewayConfig::from_lookup(lookup(&[("MATCH_HOST", "not a host")])).unwrap();
        assert!(matches!(config.bind_addr(), Err(ConfigError::Address(_))));
    }
}
