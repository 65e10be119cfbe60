//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::StreamerConfig;
use std::time::Duration;
use tracing::{info, warn};

use super::load_config;
use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_server(args: &RunArgs) -> Result<()> {
    if let Some(ref path) = args.config {
        info!(config = %path.display(), "Loading configuration");
    }

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, args);
    config_loader::validate(&config).context("Configuration invalid after CLI overrides")?;

    info!(
        listen = %config.server.listen,
        flush_interval = ?config.server.flush_interval,
        queue_capacity = config.server.queue_capacity,
        series = ?config.series_names(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        config,
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
    });

    let stats = pipeline
        .run(setup_shutdown_signal())
        .await
        .context("Server execution failed")?;

    info!(
        duration_secs = stats.duration.as_secs_f64(),
        samples_received = stats.samples_received,
        sessions = stats.sessions.total_sessions,
        "Wavecast finished"
    );
    stats.print_summary();

    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut StreamerConfig, args: &RunArgs) {
    if let Some(delay) = args.message_delay {
        info!(flush_interval = ?delay, "Overriding flush interval from CLI");
        config.server.flush_interval = delay;
    }
    if let Some(delay) = args.data_delay {
        info!(sample_interval = ?delay, "Overriding sample interval from CLI");
        config.set_sample_interval(delay);
    }
    if let Some(ref listen) = args.listen {
        config.server.listen = listen.clone();
    }
    if let Some(capacity) = args.queue_capacity {
        config.server.queue_capacity = capacity;
    }
    if args.metrics_port.is_some() {
        config.server.metrics_port = args.metrics_port;
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, stopping server...");
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &StreamerConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Server:");
    println!("  Listen: {}", config.server.listen);
    println!(
        "  Flush interval: {}",
        humantime::format_duration(config.server.flush_interval)
    );
    println!("  Queue capacity: {}", config.server.queue_capacity);
    if let Some(port) = config.server.metrics_port {
        println!("  Metrics port: {}", port);
    }

    println!("\nSeries ({}):", config.series.len());
    for series in &config.series {
        println!(
            "  - {} ({:?}) every {}",
            series.name,
            series.waveform,
            humantime::format_duration(series.sample_interval)
        );
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["wavecast", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_overrides_apply_to_every_series() {
        let mut config = StreamerConfig::default();
        let args = run_args(&["-m", "50ms", "-d", "2ms", "--queue-capacity", "10"]);

        apply_overrides(&mut config, &args);

        assert_eq!(config.server.flush_interval, Duration::from_millis(50));
        assert_eq!(config.server.queue_capacity, 10);
        assert!(config
            .series
            .iter()
            .all(|s| s.sample_interval == Duration::from_millis(2)));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = StreamerConfig::default();
        apply_overrides(&mut config, &run_args(&[]));

        assert_eq!(config.server.listen, "localhost:8080");
        assert_eq!(config.server.metrics_port, None);
    }
}
