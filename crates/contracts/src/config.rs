//! StreamerConfig - Config Loader output
//!
//! Describes the server, the flush cadence and every generated series.
//! Durations are humantime strings in files (`"16ms"`, `"1us"`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete streamer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamerConfig {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// Server and session settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Generated series, in message order
    #[serde(default = "default_series")]
    pub series: Vec<SeriesConfig>,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            server: ServerConfig::default(),
            series: default_series(),
        }
    }
}

/// Server and per-connection session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Interval between batched messages to a client
    #[serde(default = "default_flush_interval", with = "humantime_serde")]
    pub flush_interval: Duration,

    /// Capacity of every subscriber queue and source queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Prometheus exporter port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            flush_interval: default_flush_interval(),
            queue_capacity: default_queue_capacity(),
            metrics_port: None,
        }
    }
}

fn default_listen() -> String {
    "localhost:8080".to_string()
}

fn default_flush_interval() -> Duration {
    Duration::from_millis(16)
}

fn default_queue_capacity() -> usize {
    5000
}

/// One generated series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Series name, used as the message key
    pub name: String,

    /// Generator function
    pub waveform: Waveform,

    /// Interval between generated samples
    #[serde(default = "default_sample_interval", with = "humantime_serde")]
    pub sample_interval: Duration,
}

impl SeriesConfig {
    /// Create a series config with the default sample interval
    pub fn new(name: impl Into<String>, waveform: Waveform) -> Self {
        Self {
            name: name.into(),
            waveform,
            sample_interval: default_sample_interval(),
        }
    }
}

fn default_sample_interval() -> Duration {
    Duration::from_micros(1)
}

fn default_series() -> Vec<SeriesConfig> {
    vec![
        SeriesConfig::new("a", Waveform::Sine),
        SeriesConfig::new("b", Waveform::Cosine),
        SeriesConfig::new("c", Waveform::ClampedTangent),
    ]
}

/// Generator function of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// `sin(t / 5e8) / 2`
    Sine,
    /// `cos(t / 5e8) / 2`
    Cosine,
    /// `tan(t / 5e8) / 2`, clamped to [-2, 2]
    ClampedTangent,
}

impl StreamerConfig {
    /// Apply the same sample interval to every series
    pub fn set_sample_interval(&mut self, interval: Duration) {
        for series in &mut self.series {
            series.sample_interval = interval;
        }
    }

    /// Series names in message order
    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_server() {
        let config = StreamerConfig::default();
        assert_eq!(config.server.listen, "localhost:8080");
        assert_eq!(config.server.flush_interval, Duration::from_millis(16));
        assert_eq!(config.server.queue_capacity, 5000);
        assert_eq!(config.series_names(), vec!["a", "b", "c"]);
        assert_eq!(config.series[2].waveform, Waveform::ClampedTangent);
        assert_eq!(config.series[0].sample_interval, Duration::from_micros(1));
    }

    #[test]
    fn test_humantime_durations() {
        let json = r#"{
            "server": { "flush_interval": "40ms", "queue_capacity": 16 },
            "series": [{ "name": "x", "waveform": "cosine", "sample_interval": "2ms" }]
        }"#;
        let config: StreamerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.flush_interval, Duration::from_millis(40));
        assert_eq!(config.server.listen, "localhost:8080");
        assert_eq!(config.series.len(), 1);
        assert_eq!(config.series[0].sample_interval, Duration::from_millis(2));
    }

    #[test]
    fn test_set_sample_interval() {
        let mut config = StreamerConfig::default();
        config.set_sample_interval(Duration::from_millis(5));
        assert!(config
            .series
            .iter()
            .all(|s| s.sample_interval == Duration::from_millis(5)));
    }
}
