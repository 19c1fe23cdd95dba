//! Inbound request types

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::http::{Credentials, DeviceTarget};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Body of a metrics pull from the monitoring system.
///
/// Every field is optional and falls back to the configured default when the
/// key is absent. `ip` distinguishes absent (`None`) from explicit null
/// (`Some(None)`): only the former takes the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetricsRequest {
    /// Device address
    #[serde(default, deserialize_with = "present")]
    pub ip: Option<Option<String>>,
    /// Device HTTP port
    #[serde(default)]
    pub port: Option<u16>,
    /// Basic auth user
    #[serde(default)]
    pub user: Option<String>,
    /// Basic auth password
    #[serde(default)]
    pub password: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl MetricsRequest {
    /// Parse a raw request body.
    ///
    /// Anything other than a non-empty JSON object is rejected.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| Error::invalid_request("Invalid JSON body"))?;
        Self::from_value(value)
    }

    /// Build a request from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Object(map) if !map.is_empty() => {}
            _ => return Err(Error::invalid_request("Invalid JSON body")),
        }

        serde_json::from_value(value)
            .map_err(|e| Error::invalid_request(format!("Invalid request field: {e}")))
    }

    /// Fill in the configured device defaults and produce the device target
    pub fn resolve(&self, config: &BridgeConfig) -> Result<DeviceTarget> {
        let defaults = &config.device;
        let host = match &self.ip {
            None => defaults.ip.clone(),
            Some(ip) => ip.clone().unwrap_or_default(),
        };
        if host.trim().is_empty() {
            return Err(Error::invalid_request("IP missing"));
        }

        let credentials = Credentials::new(
            self.user.clone().unwrap_or_else(|| defaults.user.clone()),
            self.password
                .clone()
                .unwrap_or_else(|| defaults.password.clone()),
        );

        Ok(DeviceTarget::new(
            host.trim(),
            self.port.unwrap_or(defaults.port),
            credentials,
        ))
    }
}
