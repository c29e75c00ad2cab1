//! # Configuration Module
//!
//! Startup configuration read from the environment (optionally via `.env`),
//! plus the tuning knobs for outbound transport calls.

use std::env;
use std::fmt;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://profiles.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Settings for the outbound admission gate
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum number of outbound calls in flight at once
    pub max_concurrent: usize,
    /// Timeout for a single outbound call in seconds
    pub call_timeout_secs: u64,
    /// Base delay before retrying an edit in milliseconds
    pub retry_delay_ms: u64,
    /// How many times a failed edit is repeated
    pub edit_retries: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 8,
            call_timeout_secs: 10,
            retry_delay_ms: 250,
            edit_retries: 1,
        }
    }
}

/// How updates reach the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// HTTP webhook endpoint
    Webhook,
    /// Long polling through the teloxide dispatcher
    Polling,
}

/// Configuration problems that abort startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "Invalid value for {key}: {value}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    pub mode: RunMode,
    pub bind_addr: String,
    pub port: u16,
    /// Users allowed to save any profile through the JSON path
    pub admin_user_ids: Vec<i64>,
    pub transport: TransportConfig,
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

impl BotConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let mode = match lookup("BOT_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("webhook") => RunMode::Webhook,
            Some("polling") => RunMode::Polling,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "BOT_MODE",
                    value: other.to_string(),
                })
            }
        };

        let admin_user_ids = match lookup("ADMIN_USER_IDS") {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| {
                    id.parse::<i64>().map_err(|_| ConfigError::Invalid {
                        key: "ADMIN_USER_IDS",
                        value: raw.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        let defaults = TransportConfig::default();
        let transport = TransportConfig {
            max_concurrent: parse_var(&lookup, "TRANSPORT_MAX_CONCURRENT", defaults.max_concurrent)?,
            call_timeout_secs: parse_var(&lookup, "TRANSPORT_TIMEOUT_SECS", defaults.call_timeout_secs)?,
            retry_delay_ms: parse_var(&lookup, "TRANSPORT_RETRY_DELAY_MS", defaults.retry_delay_ms)?,
            edit_retries: defaults.edit_retries,
        };
        if transport.max_concurrent == 0 {
            return Err(ConfigError::Invalid {
                key: "TRANSPORT_MAX_CONCURRENT",
                value: "0".to_string(),
            });
        }
        if transport.call_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "TRANSPORT_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bot_token,
            database_url,
            mode,
            bind_addr: lookup("BIND_ADDR")
                .filter(|addr| !addr.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            admin_user_ids,
            transport,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_token_aborts() {
        let result = BotConfig::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.mode, RunMode::Webhook);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.admin_user_ids.is_empty());
        assert_eq!(config.transport.max_concurrent, 8);
        assert_eq!(config.transport.edit_retries, 1);
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("BOT_MODE", "polling"),
            ("PORT", "8080"),
            ("ADMIN_USER_IDS", "1, 42"),
            ("TRANSPORT_MAX_CONCURRENT", "3"),
        ]))
        .unwrap();
        assert_eq!(config.mode, RunMode::Polling);
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_user_ids, vec![1, 42]);
        assert_eq!(config.transport.max_concurrent, 3);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("PORT", "not-a-port"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "PORT", .. })));

        let result = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TRANSPORT_MAX_CONCURRENT", "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "TRANSPORT_MAX_CONCURRENT", .. })
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TRANSPORT_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::Invalid {
                key: "TRANSPORT_TIMEOUT_SECS",
                value: "0".to_string(),
            }
        );

        let config = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TRANSPORT_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.transport.call_timeout_secs, 3);
    }
}
