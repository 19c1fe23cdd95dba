//! Bridge configuration
//!
//! A single immutable [`BridgeConfig`] is built at startup (defaults, then an
//! optional YAML file, then CLI overrides), validated once and shared
//! read-only with the transport adapter and the decoder.

use crate::decode::{BerPolicy, FieldLayout, DEFAULT_CHUNK_WIDTH};
use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default outbound timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Address the HTTP server listens on
    pub listen: SocketAddr,

    /// Fallback connection values for requests that omit them
    pub device: DeviceDefaults,

    /// Timeout applied to every outbound device call, in seconds
    pub timeout_secs: u64,

    /// Device field layout and decode policy
    pub decoder: DecoderSettings,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 5000)),
            device: DeviceDefaults::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            decoder: DecoderSettings::default(),
        }
    }
}

/// Fallback device connection values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDefaults {
    /// Device address used when a request carries no `ip`
    pub ip: String,
    /// CGI port used when a request carries no `port`
    pub port: u16,
    /// Basic auth user
    pub user: String,
    /// Basic auth password
    pub password: String,
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            ip: "192.168.0.136".to_string(),
            port: 80,
            user: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

/// Decoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderSettings {
    /// Number of comma-separated fields per tuner
    pub chunk_width: usize,
    /// How the bit-error-rate field is validated
    pub ber_policy: BerPolicy,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            chunk_width: DEFAULT_CHUNK_WIDTH,
            ber_policy: BerPolicy::default(),
        }
    }
}

// ============================================================================
// Loading & Validation
// ============================================================================

impl BridgeConfig {
    /// Load a config from a YAML file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a config from YAML text and validate it
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the bridge relies on
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::invalid_config(
                "timeout_secs",
                "must be greater than zero",
            ));
        }

        let min_width = FieldLayout::default().min_width();
        if self.decoder.chunk_width < min_width {
            return Err(Error::invalid_config(
                "decoder.chunk_width",
                format!(
                    "must be at least {min_width}, got {}",
                    self.decoder.chunk_width
                ),
            ));
        }

        Ok(())
    }

    /// Outbound timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Field layout the decoder should use
    pub fn layout(&self) -> FieldLayout {
        FieldLayout::with_width(self.decoder.chunk_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.listen.port(), 5000);
        assert_eq!(config.device.ip, "192.168.0.136");
        assert_eq!(config.device.port, 80);
        assert_eq!(config.device.user, "admin");
        assert_eq!(config.device.password, "admin");
        assert_eq!(config.timeout(), Duration::from_secs(8));
        assert_eq!(config.decoder.chunk_width, 9);
        assert_eq!(config.decoder.ber_policy, BerPolicy::Preserve);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
device:
  ip: 10.0.0.5
timeout_secs: 3
"#;
        let config = BridgeConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.device.ip, "10.0.0.5");
        assert_eq!(config.device.port, 80);
        assert_eq!(config.device.user, "admin");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.decoder, DecoderSettings::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
listen: "127.0.0.1:9100"
device:
  ip: 192.168.1.20
  port: 8080
  user: monitor
  password: secret
timeout_secs: 5
decoder:
  chunk_width: 10
  ber_policy: strict
"#;
        let config = BridgeConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.listen, "127.0.0.1:9100".parse::<SocketAddr>().unwrap());
        assert_eq!(config.device.port, 8080);
        assert_eq!(config.device.user, "monitor");
        assert_eq!(config.device.password, "secret");
        assert_eq!(config.decoder.chunk_width, 10);
        assert_eq!(config.decoder.ber_policy, BerPolicy::Strict);
        assert_eq!(config.layout().chunk_width(), 10);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = BridgeConfig::from_yaml_str("timeout_secs: 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_narrow_chunk_rejected() {
        let err = BridgeConfig::from_yaml_str("decoder:\n  chunk_width: 5").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
        assert!(err.to_string().contains("at least 9"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = BridgeConfig::from_yaml_str("timeout_secs: [").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device:\n  user: operator").unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.device.user, "operator");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BridgeConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
