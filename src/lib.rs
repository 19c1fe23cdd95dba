//! # Tuner Bridge
//!
//! Translates Zabbix metrics pulls into calls to a broadcast tuner's
//! proprietary `tuner.cgi` interface and turns the flat, positional answer
//! into per-tuner LLD items.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tuner_bridge::{decode, BridgeConfig, MetricsBridge, MetricsRequest, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Offline: decode a captured payload
//!     let result = decode("tuner:1,a,b,42,57,c,12 db,-30 dbm,2e-6", 9);
//!     assert_eq!(result.records[0].quality, 42);
//!
//!     // Online: pull from a device
//!     let bridge = MetricsBridge::from_config(&BridgeConfig::default())?;
//!     let request = MetricsRequest::from_body(br#"{"ip": "192.168.0.136"}"#)?;
//!     let result = bridge.collect(&request).await?;
//!     println!("{}", serde_json::to_string(&result.records)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  POST /metrics   ┌────────────────┐  POST tuner.cgi  ┌────────┐
//! │    Zabbix    │ ───────────────▶ │  MetricsBridge │ ───────────────▶ │ Device │
//! └──────────────┘ ◀─────────────── └────────────────┘ ◀─────────────── └────────┘
//!                    LLD JSON list     │ decode (pure)    "tuner:f,f,..."
//!                                      ▼
//!                                 TunerDecoder
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the bridge
pub mod error;

/// Bridge configuration
pub mod config;

/// tuner.cgi response decoder
pub mod decode;

/// HTTP transport toward the device
pub mod http;

/// Request resolution and orchestration
pub mod engine;

/// Command-line interface and HTTP server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::BridgeConfig;
pub use decode::{decode, DecodeResult, TunerDecoder, TunerRecord};
pub use engine::{MetricsBridge, MetricsRequest};
pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
