//! Pipeline orchestrator - wires sources, broadcasters and the server.
//!
//! ```text
//! SourcePool ──► Broadcaster (per series) ──► Session (per client) ──► WebSocket
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use broadcaster::Broadcaster;
use contracts::{Sample, StreamerConfig};
use generator::SourcePool;
use server::AppState;
use session::SessionConfig;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::PipelineStats;

/// Grace period for broadcaster loops after the sources stop
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Resolved streamer configuration
    pub config: StreamerConfig,

    /// Stop serving after this long (None = until shutdown)
    pub timeout: Option<Duration>,
}

/// Main orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Serve until `shutdown` resolves (or the timeout elapses), then tear down
    pub async fn run<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let start_time = Instant::now();
        let config = &self.config.config;

        if let Some(port) = config.server.metrics_port {
            observability::install_metrics_exporter(port)?;
        }

        // Sources
        let pool = SourcePool::from_series(&config.series, config.server.queue_capacity);
        let queues = pool.start_all().context("Failed to start sample sources")?;
        info!(sources = pool.len(), "Sample sources started");

        // Broadcasters, in configured series order
        let (broadcasters, tasks): (Vec<Arc<Broadcaster<Sample>>>, Vec<JoinHandle<()>>) = queues
            .into_iter()
            .map(|(series, queue)| Broadcaster::spawn(series, queue))
            .unzip();
        info!(broadcasters = broadcasters.len(), "Broadcasters running");

        // Server
        let state = AppState::new(broadcasters.clone(), SessionConfig::from(&config.server));
        let listener = server::bind(&config.server.listen)
            .await
            .with_context(|| format!("Failed to listen on {}", config.server.listen))?;

        let timeout = self.config.timeout;
        let stop = async move {
            match timeout {
                Some(limit) => {
                    tokio::select! {
                        _ = shutdown => {},
                        _ = tokio::time::sleep(limit) => {
                            info!(timeout_secs = limit.as_secs(), "Run timeout reached");
                        }
                    }
                }
                None => shutdown.await,
            }
        };

        let served = server::serve(listener, state.clone(), stop).await;

        // Teardown runs even when serving failed.
        info!("Shutting down...");
        for broadcaster in &broadcasters {
            broadcaster.shutdown();
        }
        pool.stop_all();

        for task in tasks {
            if tokio::time::timeout(DRAIN_TIMEOUT, task).await.is_err() {
                warn!("Broadcaster did not stop within drain timeout");
            }
        }

        served.context("Server failed")?;

        let stats = PipelineStats::collect(
            &broadcasters,
            state.session_summary(),
            start_time.elapsed(),
        );

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            rate = format!("{:.0}", stats.sample_rate()),
            "Shutdown complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StreamerConfig {
        let mut config = StreamerConfig::default();
        config.server.listen = "127.0.0.1:0".to_string();
        config.server.queue_capacity = 64;
        config.set_sample_interval(Duration::from_millis(1));
        config
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let pipeline = Pipeline::new(PipelineConfig {
            config: test_config(),
            timeout: None,
        });

        let stats = pipeline
            .run(tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap();

        assert_eq!(stats.series.len(), 3);
        assert!(stats.samples_received > 0);
        assert_eq!(stats.sessions.total_sessions, 0);
    }

    #[tokio::test]
    async fn test_timeout_stops_run() {
        let pipeline = Pipeline::new(PipelineConfig {
            config: test_config(),
            timeout: Some(Duration::from_millis(50)),
        });

        let stats = pipeline.run(std::future::pending()).await.unwrap();
        assert!(stats.duration >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let mut config = test_config();
        config.server.listen = "256.0.0.1:1".to_string();
        let pipeline = Pipeline::new(PipelineConfig {
            config,
            timeout: None,
        });

        let err = pipeline.run(std::future::pending()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to listen"));
    }
}
