//! Ticker sample source
//!
//! A tokio task that wakes every `sample_interval`, evaluates the series'
//! waveform at the current wall-clock time and pushes the sample into a
//! bounded source queue. The push awaits when the queue is full, so the
//! broadcaster paces the generator rather than the other way round.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use async_channel::{bounded, Receiver, Sender};
use contracts::{ContractError, Sample, SampleSource, SeriesConfig};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};

use crate::config::GeneratorMetrics;
use crate::error::GeneratorError;
use crate::waveform::evaluate;

/// Current Unix-epoch time in nanoseconds
pub fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// One producer task's handles; each `start` gets a fresh flag
struct Run {
    running: Arc<AtomicBool>,
    sender: Sender<Sample>,
}

/// Timer-driven sample source for one series
pub struct TickerSource {
    config: SeriesConfig,
    run: Mutex<Option<Run>>,
    metrics: Arc<GeneratorMetrics>,
}

impl TickerSource {
    /// Create a new source; nothing runs until `start`
    pub fn new(config: SeriesConfig) -> Self {
        Self {
            config,
            run: Mutex::new(None),
            metrics: Arc::new(GeneratorMetrics::new()),
        }
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<GeneratorMetrics> {
        self.metrics.clone()
    }

    /// Start producing, returning the consumer end of the source queue
    ///
    /// # Errors
    /// - `InvalidInterval` if the sample interval is zero
    /// - `AlreadyRunning` if `start` was already called without `stop`
    #[instrument(
        name = "ticker_source_start",
        skip(self),
        fields(series = %self.config.name)
    )]
    pub fn try_start(&self, capacity: usize) -> crate::Result<Receiver<Sample>> {
        if self.config.sample_interval.is_zero() {
            return Err(GeneratorError::InvalidInterval {
                series: self.config.name.clone(),
            });
        }

        let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        if run.as_ref().is_some_and(|r| r.running.load(Ordering::SeqCst)) {
            return Err(GeneratorError::AlreadyRunning {
                series: self.config.name.clone(),
            });
        }

        let (tx, rx) = bounded(capacity.max(1));
        let running = Arc::new(AtomicBool::new(true));
        *run = Some(Run {
            running: running.clone(),
            sender: tx.clone(),
        });
        self.spawn_producer(tx, running);
        Ok(rx)
    }

    fn spawn_producer(&self, tx: Sender<Sample>, running: Arc<AtomicBool>) {
        let config = self.config.clone();
        let metrics = self.metrics.clone();
        let produced = metrics::counter!(
            "wavecast_samples_generated_total",
            "series" => config.name.clone()
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.sample_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                series = %config.name,
                waveform = ?config.waveform,
                interval_us = config.sample_interval.as_micros() as u64,
                "sample source started"
            );

            while running.load(Ordering::Relaxed) {
                ticker.tick().await;

                let timestamp = unix_nanos();
                let sample = Sample::new(evaluate(config.waveform, timestamp), timestamp);

                if tx.send(sample).await.is_err() {
                    debug!(series = %config.name, "source queue closed");
                    break;
                }

                metrics.record_produced();
                metrics.update_queue_len(tx.len());
                produced.increment(1);
            }

            running.store(false, Ordering::SeqCst);
            tx.close();
            info!(
                series = %config.name,
                produced = metrics.snapshot().samples_produced,
                "sample source stopped"
            );
        });
    }
}

impl SampleSource for TickerSource {
    fn series(&self) -> &str {
        &self.config.name
    }

    fn start(&self, capacity: usize) -> Result<Receiver<Sample>, ContractError> {
        Ok(self.try_start(capacity)?)
    }

    fn stop(&self) {
        if let Some(run) = self.run.lock().unwrap_or_else(PoisonError::into_inner).take() {
            run.running.store(false, Ordering::SeqCst);
            // Closing wakes a producer parked on a full queue.
            run.sender.close();
        }
    }

    fn is_running(&self) -> bool {
        self.run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|r| r.running.load(Ordering::Relaxed))
    }
}

impl Drop for TickerSource {
    fn drop(&mut self) {
        self.stop();
    }
}
