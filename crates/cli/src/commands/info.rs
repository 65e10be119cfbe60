//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::StreamerConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    server: ServerInfo,
    series_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    series: Vec<SeriesInfo>,
}

#[derive(Serialize)]
struct ServerInfo {
    listen: String,
    flush_interval: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
}

#[derive(Serialize)]
struct SeriesInfo {
    name: String,
    waveform: String,
    sample_interval: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    match args.config {
        Some(ref path) => info!(config = %path.display(), "Loading configuration info"),
        None => info!("Showing built-in default configuration"),
    }

    let config =
        super::load_config(args.config.as_deref()).context("Failed to load configuration")?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &StreamerConfig, args: &InfoArgs) -> ConfigInfo {
    let series = if args.series {
        config
            .series
            .iter()
            .map(|s| SeriesInfo {
                name: s.name.clone(),
                waveform: format!("{:?}", s.waveform),
                sample_interval: humantime::format_duration(s.sample_interval).to_string(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", config.version),
        server: ServerInfo {
            listen: config.server.listen.clone(),
            flush_interval: humantime::format_duration(config.server.flush_interval).to_string(),
            queue_capacity: config.server.queue_capacity,
            metrics_port: config.server.metrics_port,
        },
        series_names: config.series.iter().map(|s| s.name.clone()).collect(),
        series,
    }
}

fn print_config_info(config: &StreamerConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Wavecast Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let server = &config.server;
    println!("🌐 Server");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ Listen: {}", server.listen);
    println!(
        "   ├─ Flush interval: {}",
        humantime::format_duration(server.flush_interval)
    );
    println!("   ├─ Queue capacity: {}", server.queue_capacity);
    match server.metrics_port {
        Some(port) => println!("   └─ Metrics: 0.0.0.0:{}", port),
        None => println!("   └─ Metrics: disabled"),
    }

    println!("\n📈 Series ({})", config.series.len());
    for (i, series) in config.series.iter().enumerate() {
        let prefix = if i == config.series.len() - 1 {
            "└─"
        } else {
            "├─"
        };

        if args.series {
            println!(
                "   {} {} ({:?}, every {})",
                prefix,
                series.name,
                series.waveform,
                humantime::format_duration(series.sample_interval)
            );
        } else {
            println!("   {} {}", prefix, series.name);
        }
    }

    println!();
}
