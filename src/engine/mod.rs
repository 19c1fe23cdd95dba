//! Metrics bridge engine
//!
//! Resolves an inbound [`MetricsRequest`] against the configured defaults,
//! pulls the raw payload once from a [`PayloadSource`] and decodes it.
//!
//! ```text
//! MetricsRequest ──resolve──▶ DeviceTarget ──fetch_raw──▶ raw text ──decode──▶ DecodeResult
//! ```

mod types;

pub use types::MetricsRequest;

use crate::config::BridgeConfig;
use crate::decode::{DecodeResult, TunerDecoder};
use crate::error::Result;
use crate::http::{DeviceClient, DeviceClientConfig, PayloadSource};
use tracing::info;

/// Pulls tuner metrics from a device and decodes them
#[derive(Debug)]
pub struct MetricsBridge<S = DeviceClient> {
    source: S,
    decoder: TunerDecoder,
    config: BridgeConfig,
}

impl MetricsBridge<DeviceClient> {
    /// Build a bridge talking HTTP to real devices
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let client =
            DeviceClient::with_config(DeviceClientConfig::default().timeout(config.timeout()))?;
        Ok(Self::new(client, config))
    }
}

impl<S: PayloadSource> MetricsBridge<S> {
    /// Build a bridge over any payload source
    pub fn new(source: S, config: &BridgeConfig) -> Self {
        Self {
            source,
            decoder: TunerDecoder::new(config.layout(), config.decoder.ber_policy),
            config: config.clone(),
        }
    }

    /// The decoder in use
    pub fn decoder(&self) -> &TunerDecoder {
        &self.decoder
    }

    /// Resolve, fetch and decode one request
    pub async fn collect(&self, request: &MetricsRequest) -> Result<DecodeResult> {
        let target = request.resolve(&self.config)?;
        let raw = self.source.fetch_raw(&target).await?;
        let result = self.decoder.decode(&raw);

        info!(
            host = %target.host,
            port = target.port,
            records = result.len(),
            skipped = result.skipped_count(),
            "Collected tuner metrics"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests;
