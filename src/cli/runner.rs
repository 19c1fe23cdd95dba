//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::BridgeConfig;
use crate::decode::{DecodeResult, TunerDecoder};
use crate::engine::{MetricsBridge, MetricsRequest};
use crate::error::{Result, ResultExt};
use std::fmt::Write as _;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.config()?;
        debug!(
            listen = %config.listen,
            timeout_secs = config.timeout_secs,
            chunk_width = config.decoder.chunk_width,
            "Resolved configuration"
        );

        match &self.cli.command {
            Commands::Serve { listen } => {
                let mut config = config;
                if let Some(listen) = listen {
                    config.listen = *listen;
                }
                crate::cli::serve(config).await
            }
            Commands::Fetch {
                ip,
                port,
                user,
                password,
                format,
            } => {
                let request = MetricsRequest {
                    ip: ip.clone().map(Some),
                    port: *port,
                    user: user.clone(),
                    password: password.clone(),
                };
                self.fetch(&config, &request, *format).await
            }
            Commands::Decode { file, format } => {
                self.decode(&config, file.as_deref(), *format).await
            }
        }
    }

    /// Load the config file (if any) and apply command-line overrides
    pub fn config(&self) -> Result<BridgeConfig> {
        let mut config = match &self.cli.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };

        if let Some(timeout) = self.cli.timeout {
            config.timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// One-shot pull from a device
    async fn fetch(
        &self,
        config: &BridgeConfig,
        request: &MetricsRequest,
        format: OutputFormat,
    ) -> Result<()> {
        let bridge = MetricsBridge::from_config(config)?;
        let result = bridge.collect(request).await?;
        println!("{}", render(&result, format)?);
        Ok(())
    }

    /// Decode a captured payload without touching the network
    async fn decode(
        &self,
        config: &BridgeConfig,
        file: Option<&Path>,
        format: OutputFormat,
    ) -> Result<()> {
        let raw = match file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read payload {}", path.display()))?,
            None => {
                let mut raw = String::new();
                tokio::io::stdin().read_to_string(&mut raw).await?;
                raw
            }
        };

        let decoder = TunerDecoder::new(config.layout(), config.decoder.ber_policy);
        // Captures usually end with a newline the device never sent
        let result = decoder.decode(raw.trim_end_matches(['\r', '\n']));
        println!("{}", render(&result, format)?);
        Ok(())
    }
}

/// Render a decode result for stdout
pub fn render(result: &DecodeResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&result.records)?),
        OutputFormat::Pretty => Ok(render_table(result)),
    }
}

fn render_table(result: &DecodeResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>7} {:>8} {:>8} {:>10}  BER",
        "TUNER", "QUALITY", "STRENGTH", "C/N dB", "POWER dBm"
    );
    for r in &result.records {
        let _ = writeln!(
            out,
            "{:<8} {:>7} {:>8} {:>8.1} {:>10.1}  {}",
            r.id, r.quality, r.strength, r.carrier_to_noise, r.power, r.bit_error_rate
        );
    }
    for skipped in &result.skipped {
        let _ = writeln!(out, "skipped chunk {}: {}", skipped.index, skipped.reason);
    }
    if result.tail_tokens > 0 {
        let _ = writeln!(out, "ignored {} trailing token(s)", result.tail_tokens);
    }
    out.trim_end().to_string()
}
