//! CLI module
//!
//! Command-line interface for the bridge.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode (`POST /metrics`, `GET /health`)
//! - `fetch` - Pull metrics from one device and print them
//! - `decode` - Decode a captured tuner.cgi payload offline

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{render, Runner};
pub use server::{error_response, router, serve};
