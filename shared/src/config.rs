//! Client configuration.
//!
//! The shell delivers a [`ClientConfig`] through `Event::Configure`; every
//! field has a default so a partial JSON document is enough. Requests go to
//! absolute URLs, so a page served by the bridge passes its own origin as
//! `baseUrl`. Request timeouts are the shell's HTTP client's business.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_STATE_POLL_MS: u64 = 5_000;
pub const DEFAULT_MESSAGE_POLL_MS: u64 = 2_000;
pub const DEFAULT_BANNER_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_THRESHOLD_HINT_RESET_MS: u64 = 4_000;
pub const DEFAULT_MESSAGE_BUFFER_CAPACITY: usize = 120;
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// The bridge's soft access point address.
pub const DEFAULT_BASE_URL: &str = "http://192.168.4.1";

pub const STATE_PATH: &str = "/api/state";
pub const MESSAGES_PATH: &str = "/api/messages";
pub const COMMAND_PATH: &str = "/api/cmd";
pub const THRESHOLDS_PATH: &str = "/api/thresholds";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: u64,
        value: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub base_url: String,
    pub state_poll_interval_ms: u64,
    pub message_poll_interval_ms: u64,
    pub banner_timeout_ms: u64,
    pub threshold_hint_reset_ms: u64,
    pub message_buffer_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            state_poll_interval_ms: DEFAULT_STATE_POLL_MS,
            message_poll_interval_ms: DEFAULT_MESSAGE_POLL_MS,
            banner_timeout_ms: DEFAULT_BANNER_TIMEOUT_MS,
            threshold_hint_reset_ms: DEFAULT_THRESHOLD_HINT_RESET_MS,
            message_buffer_capacity: DEFAULT_MESSAGE_BUFFER_CAPACITY,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base()?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(self.invalid_base(format!("unsupported scheme '{}'", base.scheme())));
        }
        if base.host_str().is_none() {
            return Err(self.invalid_base("missing host".to_string()));
        }

        for (field, value) in [
            ("statePollIntervalMs", self.state_poll_interval_ms),
            ("messagePollIntervalMs", self.message_poll_interval_ms),
        ] {
            if value < MIN_POLL_INTERVAL_MS {
                return Err(ConfigError::TooSmall {
                    field,
                    min: MIN_POLL_INTERVAL_MS,
                    value,
                });
            }
        }

        if self.message_buffer_capacity == 0 {
            return Err(ConfigError::TooSmall {
                field: "messageBufferCapacity",
                min: 1,
                value: 0,
            });
        }

        Ok(())
    }

    /// `path_and_query` resolved against the base URL.
    pub fn endpoint(&self, path_and_query: &str) -> Result<Url, ConfigError> {
        self.base()?
            .join(path_and_query)
            .map_err(|e| self.invalid_base(e.to_string()))
    }

    fn base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|e| self.invalid_base(e.to_string()))
    }

    fn invalid_base(&self, reason: String) -> ConfigError {
        ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bridge_timings() {
        let config = ClientConfig::default();
        assert_eq!(config.state_poll_interval_ms, 5_000);
        assert_eq!(config.message_poll_interval_ms, 2_000);
        assert_eq!(config.banner_timeout_ms, 5_000);
        assert_eq!(config.message_buffer_capacity, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"baseUrl": "http://10.0.0.7", "statePollIntervalMs": 1000}"#;
        let config: ClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.7");
        assert_eq!(config.state_poll_interval_ms, 1000);
        assert_eq!(config.message_poll_interval_ms, DEFAULT_MESSAGE_POLL_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_endpoint_targets_the_access_point() {
        let config = ClientConfig::default();
        assert_eq!(
            config.endpoint("/api/messages?after=3").unwrap().as_str(),
            "http://192.168.4.1/api/messages?after=3"
        );
    }

    #[test]
    fn base_url_path_is_replaced_by_absolute_endpoint() {
        let config = ClientConfig {
            base_url: "https://bridge.local/console/".into(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.endpoint("/api/state").unwrap().as_str(),
            "https://bridge.local/api/state"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        let config = ClientConfig {
            base_url: "ftp://bridge.local".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        for base_url in ["not a url", ""] {
            let config = ClientConfig {
                base_url: base_url.into(),
                ..ClientConfig::default()
            };
            assert!(config.validate().is_err());
            assert!(config.endpoint("/api/state").is_err());
        }
    }

    #[test]
    fn rejects_degenerate_values() {
        let config = ClientConfig {
            message_poll_interval_ms: 0,
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::TooSmall { .. })));

        let config = ClientConfig {
            message_buffer_capacity: 0,
            ..ClientConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooSmall {
                field: "messageBufferCapacity",
                min: 1,
                value: 0,
            })
        );
    }
}
