//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Wavecast - streams generated waveforms to WebSocket clients
#[derive(Parser, Debug)]
#[command(
    name = "wavecast",
    author,
    version,
    about = "Real-time waveform streaming over WebSocket",
    long_about = "Generates sample series at a fixed rate, fans every series out to all \n\
                  connected WebSocket clients and delivers them as one JSON message \n\
                  per flush interval."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "WAVECAST_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "WAVECAST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log level from `-q` / `-v`
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve generated series to WebSocket clients
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "WAVECAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Delay between messages sent to a client, e.g. "16ms"
    #[arg(short = 'm', long, value_parser = humantime::parse_duration, env = "WAVECAST_MESSAGE_DELAY")]
    pub message_delay: Option<Duration>,

    /// Delay between generated samples of every series, e.g. "1us"
    #[arg(short = 'd', long, value_parser = humantime::parse_duration, env = "WAVECAST_DATA_DELAY")]
    pub data_delay: Option<Duration>,

    /// Listen address, e.g. "localhost:8080"
    #[arg(short = 'l', long, env = "WAVECAST_LISTEN")]
    pub listen: Option<String>,

    /// Capacity of every source and subscriber queue
    #[arg(long, env = "WAVECAST_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Prometheus exporter port
    #[arg(long, env = "WAVECAST_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Stop serving after this many seconds (0 = run until signalled)
    #[arg(long, default_value = "0", env = "WAVECAST_TIMEOUT")]
    pub timeout: u64,

    /// Resolve and validate configuration, then exit
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "wavecast.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show per-series details
    #[arg(long)]
    pub series: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "wavecast", "run", "-m", "33ms", "-d", "10us", "-l", "0.0.0.0:9000",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.message_delay, Some(Duration::from_millis(33)));
        assert_eq!(args.data_delay, Some(Duration::from_micros(10)));
        assert_eq!(args.listen.as_deref(), Some("0.0.0.0:9000"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_bad_duration_rejected() {
        assert!(Cli::try_parse_from(["wavecast", "run", "-m", "fast"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["wavecast", "-vv", "info"]).unwrap();
        assert_eq!(cli.log_level(), "trace");

        let cli = Cli::try_parse_from(["wavecast", "-q", "info"]).unwrap();
        assert_eq!(cli.log_level(), "warn");
    }
}
