//! Server configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Main server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Port (default: 3000).
    pub port: u16,
    /// Enrichment (name resolution) configuration.
    pub enrichment: EnrichmentConfig,
    /// Maximum usage records returned by the management listing.
    pub usage_page_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            enrichment: EnrichmentConfig::default(),
            usage_page_limit: 1000,
        }
    }
}

impl ServerConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.usage_page_limit == 0 {
            return Err(ConfigError::InvalidLimit(
                "usage_page_limit cannot be 0".into(),
            ));
        }
        if self.enrichment.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "enrichment timeout cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// Bind address for the HTTP server.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Best-effort enrichment configuration.
///
/// A slow or dead enrichment endpoint must never add unbounded latency to
/// the reporting path; `timeout` caps the wait before falling back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Base URL of the external name-resolution service. `None` disables
    /// enrichment entirely.
    pub resolver_url: Option<String>,
    /// Per-request cap before falling back to the client-supplied name.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Analytics collection endpoint. `None` disables notifications.
    pub analytics_url: Option<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            resolver_url: None,
            timeout: Duration::from_secs(5),
            analytics_url: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Serialize durations as whole seconds in config files.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ServerConfig::default();
        config.enrichment.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = ServerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.port, config.port);
        assert_eq!(back.enrichment.timeout, config.enrichment.timeout);
    }
}
