//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::StreamerConfig;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    listen: String,
    flush_interval: String,
    queue_capacity: usize,
    series_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match super::load_config(Some(&args.config)) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    listen: config.server.listen.clone(),
                    flush_interval: humantime::format_duration(config.server.flush_interval)
                        .to_string(),
                    queue_capacity: config.server.queue_capacity,
                    series_count: config.series.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &StreamerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    for series in &config.series {
        // Faster than a flush can carry out of a full queue: drops are certain.
        let per_flush = config.server.flush_interval.as_nanos()
            / series.sample_interval.as_nanos().max(1);
        if per_flush > config.server.queue_capacity as u128 {
            warnings.push(format!(
                "Series '{}' produces ~{} samples per flush, more than queue_capacity ({}); \
                 clients will drop samples",
                series.name, per_flush, config.server.queue_capacity
            ));
        }

        if series.sample_interval < Duration::from_micros(1) {
            warnings.push(format!(
                "Series '{}' sample_interval is below timer resolution",
                series.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Listen: {}", summary.listen);
            println!("  Flush interval: {}", summary.flush_interval);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!("  Series: {}", summary.series_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_warns_about_drops() {
        // 16ms / 1us = 16000 samples per flush against a 5000 queue.
        let warnings = collect_warnings(&StreamerConfig::default());
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("'a'"));
    }

    #[test]
    fn test_valid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(
            b"[server]\nflush_interval = \"10ms\"\n\n[[series]]\nname = \"x\"\nwaveform = \"sine\"\nsample_interval = \"1ms\"\n",
        )
        .unwrap();

        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        let result = validate_config(&args);
        assert!(result.valid);
        assert!(result.warnings.is_none());
        assert_eq!(result.summary.unwrap().series_count, 1);
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: "/nonexistent/wavecast.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
    }
}
