//! Device HTTP client
//!
//! Performs the single authenticated POST to tuner.cgi and classifies
//! failures. Every request is bounded by the configured timeout and is
//! never retried: the caller has its own deadline. Connections are not
//! pooled, so each fetch opens its own socket to the device.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// CGI endpoint that reports tuner status
pub const TUNER_CGI_PATH: &str = "/cgi-bin/tuner.cgi";

/// Form fields the device requires to return the tuner table
pub const TUNER_FORM: [(&str, &str); 3] = [
    ("h_setflag", "3"),
    ("edit_ch", "1"),
    ("h_tuner_type", "1"),
];

// ============================================================================
// Target
// ============================================================================

/// Basic auth credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username
    pub user: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// The device a request is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    /// Host name or IP address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Basic auth credentials
    pub credentials: Credentials,
}

impl DeviceTarget {
    /// Create a target
    pub fn new(host: impl Into<String>, port: u16, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port,
            credentials,
        }
    }

    /// Full tuner.cgi URL for this target
    pub fn url(&self) -> Result<Url> {
        let host = self.host.trim();
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };

        let url = Url::parse(&format!("http://{host}:{}{TUNER_CGI_PATH}", self.port))?;

        // Reject hosts that smuggle in a path, query or credentials
        if url.path() != TUNER_CGI_PATH
            || url.query().is_some()
            || !url.username().is_empty()
            || url.host_str().is_none()
        {
            return Err(Error::invalid_request(format!(
                "Invalid device address: {}",
                self.host
            )));
        }

        Ok(url)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Configuration for the device client
#[derive(Debug, Clone)]
pub struct DeviceClientConfig {
    /// Timeout for the whole request, body included
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for DeviceClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("tuner-bridge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DeviceClientConfig {
    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Source of raw tuner payloads
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Fetch the raw tuner.cgi body from a device
    async fn fetch_raw(&self, target: &DeviceTarget) -> Result<String>;
}

/// HTTP client for the device CGI
#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: Client,
    config: DeviceClientConfig,
}

impl DeviceClient {
    /// Create a client with custom configuration
    pub fn with_config(config: DeviceClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self { client, config })
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Map a reqwest failure onto the bridge's transport errors
    fn classify(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            return Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            };
        }
        if e.is_builder() {
            return Error::Http(e);
        }
        Error::connection(error_chain(&e))
    }
}

#[async_trait]
impl PayloadSource for DeviceClient {
    async fn fetch_raw(&self, target: &DeviceTarget) -> Result<String> {
        let url = target.url()?;
        debug!(%url, user = %target.credentials.user, "Requesting tuner status");

        let response = self
            .client
            .post(url.clone())
            .timeout(self.config.timeout)
            .basic_auth(
                &target.credentials.user,
                Some(&target.credentials.password),
            )
            .form(&TUNER_FORM)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "Device returned non-200 status");
            let body = response.text().await.unwrap_or_default();
            debug!(%url, status = status.as_u16(), %body, "Device error body");
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!(%url, bytes = body.len(), "Received tuner payload");
        Ok(body)
    }
}

/// Render an error with its source chain, e.g. `error sending request: connection refused`
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
