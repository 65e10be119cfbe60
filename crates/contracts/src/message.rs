//! BatchMessage - Session output
//!
//! One outbound frame: every joined series with the samples it accumulated
//! since the previous flush.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::Sample;

/// Samples of one series accumulated between two flushes
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBatch {
    /// Series name (message key)
    pub series: String,

    /// Samples in arrival order
    pub samples: Vec<Sample>,
}

impl SeriesBatch {
    /// Create a batch
    pub fn new(series: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            series: series.into(),
            samples,
        }
    }
}

/// Combined outbound message
///
/// Encodes as a JSON object keyed by series name, in join order:
/// `{"a": [{"data": 0.1, "timestamp": 1}], "b": []}`. Series with no samples
/// stay in the message as empty arrays so its shape is stable across flushes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchMessage {
    /// Per-series batches
    pub batches: Vec<SeriesBatch>,
}

impl BatchMessage {
    /// Create an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch for a series, if the series is part of the message
    pub fn series(&self, name: &str) -> Option<&[Sample]> {
        self.batches
            .iter()
            .find(|batch| batch.series == name)
            .map(|batch| batch.samples.as_slice())
    }

    /// Total samples across all series
    pub fn sample_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.samples.len()).sum()
    }

    /// True when no series carries a sample
    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(|batch| batch.samples.is_empty())
    }
}

impl Serialize for BatchMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.batches.len()))?;
        for batch in &self.batches {
            map.serialize_entry(&batch.series, &batch.samples)?;
        }
        map.end()
    }
}
