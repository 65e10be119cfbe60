//! Source pool
//!
//! Owns every sample source of the process and starts/stops them together.

use async_channel::Receiver;
use contracts::{ContractError, Sample, SampleSource, SeriesConfig};
use tracing::{debug, info, instrument};

use crate::ticker::TickerSource;

/// Set of sample sources, one per series, in configured order
pub struct SourcePool {
    /// Registered sources
    sources: Vec<Box<dyn SampleSource>>,

    /// Source queue capacity
    capacity: usize,
}

impl SourcePool {
    /// Create an empty pool
    ///
    /// # Arguments
    /// * `capacity` - Capacity of each source queue
    pub fn new(capacity: usize) -> Self {
        Self {
            sources: Vec::new(),
            capacity,
        }
    }

    /// Create a pool with one `TickerSource` per series config
    pub fn from_series(series: &[SeriesConfig], capacity: usize) -> Self {
        let mut pool = Self::new(capacity);
        for config in series {
            pool.register(Box::new(TickerSource::new(config.clone())));
        }
        pool
    }

    /// Register a source
    pub fn register(&mut self, source: Box<dyn SampleSource>) {
        debug!(series = %source.series(), "registered sample source");
        self.sources.push(source);
    }

    /// Start every source, returning `(series, queue)` pairs in registration order
    ///
    /// # Errors
    /// Fails on the first source that cannot start; sources already started
    /// are stopped again.
    #[instrument(name = "source_pool_start_all", skip(self), fields(count = self.sources.len()))]
    pub fn start_all(&self) -> Result<Vec<(String, Receiver<Sample>)>, ContractError> {
        let mut queues = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.start(self.capacity) {
                Ok(rx) => queues.push((source.series().to_string(), rx)),
                Err(e) => {
                    self.stop_all();
                    return Err(e);
                }
            }
        }
        info!(count = queues.len(), "all sample sources started");
        Ok(queues)
    }

    /// Stop every running source
    #[instrument(name = "source_pool_stop_all", skip(self))]
    pub fn stop_all(&self) {
        for source in &self.sources {
            if source.is_running() {
                debug!(series = %source.series(), "stopping sample source");
                source.stop();
            }
        }
    }

    /// Number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True when no source is registered
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Check if a series' source is running
    pub fn is_running(&self, series: &str) -> bool {
        self.sources
            .iter()
            .find(|s| s.series() == series)
            .map(|s| s.is_running())
            .unwrap_or(false)
    }
}

impl Drop for SourcePool {
    fn drop(&mut self) {
        self.stop_all();
    }
}
