//! Per-series sample accumulator

use contracts::{BatchMessage, Sample, SeriesBatch};

/// Samples received since the last successful flush, one buffer per series
#[derive(Debug, Default)]
pub struct PendingBatch {
    buffers: Vec<Vec<Sample>>,
}

impl PendingBatch {
    pub fn new(series_count: usize) -> Self {
        Self {
            buffers: vec![Vec::new(); series_count],
        }
    }

    /// Append a sample to its series, keeping arrival order
    pub fn push(&mut self, index: usize, sample: Sample) {
        if let Some(buffer) = self.buffers.get_mut(index) {
            buffer.push(sample);
        }
    }

    /// True when every series buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffers.iter().all(Vec::is_empty)
    }

    /// Total pending samples across series
    pub fn len(&self) -> usize {
        self.buffers.iter().map(Vec::len).sum()
    }

    /// Build the message for this tick and reset every buffer
    ///
    /// Every series appears in `series` order, empty ones as `[]`.
    pub fn take(&mut self, series: &[String]) -> BatchMessage {
        BatchMessage {
            batches: series
                .iter()
                .zip(self.buffers.iter_mut())
                .map(|(name, buffer)| SeriesBatch::new(name.clone(), std::mem::take(buffer)))
                .collect(),
        }
    }
}
