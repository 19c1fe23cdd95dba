//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Zabbix bridge for tuner.cgi devices
#[derive(Parser, Debug)]
#[command(name = "tuner-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the device timeout, in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server mode
    Serve {
        /// Address to listen on (default from config, 0.0.0.0:5000)
        #[arg(short, long)]
        listen: Option<SocketAddr>,
    },

    /// Pull metrics from one device and print them
    Fetch {
        /// Device address
        #[arg(long)]
        ip: Option<String>,

        /// Device HTTP port
        #[arg(long)]
        port: Option<u16>,

        /// Basic auth user
        #[arg(long)]
        user: Option<String>,

        /// Basic auth password
        #[arg(long)]
        password: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Decode a captured tuner.cgi payload (file or stdin)
    Decode {
        /// Payload file, reads stdin when omitted
        file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// LLD JSON array
    Json,
    /// Human-readable table
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["tuner-bridge", "serve", "--listen", "127.0.0.1:9000"]);
        assert!(matches!(
            cli.command,
            Commands::Serve { listen: Some(addr) } if addr.port() == 9000
        ));
    }

    #[test]
    fn test_parse_fetch_with_globals() {
        let cli = Cli::parse_from([
            "tuner-bridge",
            "fetch",
            "--ip",
            "10.0.0.2",
            "--port",
            "8080",
            "--timeout",
            "3",
            "-C",
            "bridge.yaml",
            "-f",
            "pretty",
        ]);

        assert_eq!(cli.timeout, Some(3));
        assert_eq!(cli.config, Some(PathBuf::from("bridge.yaml")));
        match cli.command {
            Commands::Fetch {
                ip, port, format, ..
            } => {
                assert_eq!(ip.as_deref(), Some("10.0.0.2"));
                assert_eq!(port, Some(8080));
                assert_eq!(format, OutputFormat::Pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_decode_stdin() {
        let cli = Cli::parse_from(["tuner-bridge", "decode", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Decode {
                file: None,
                format: OutputFormat::Json
            }
        ));
    }
}
