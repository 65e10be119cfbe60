//! Sample - generator output
//!
//! One timestamped scalar data point of a series.

use serde::{Deserialize, Serialize};

/// A single data point
///
/// Immutable once produced. `Copy` so fan-out never allocates per subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample value (serialized as `data` for chart clients)
    #[serde(rename = "data")]
    pub value: f64,

    /// Unix-epoch nanoseconds at generation time
    pub timestamp: u64,
}

impl Sample {
    /// Create a sample
    pub fn new(value: f64, timestamp: u64) -> Self {
        Self { value, timestamp }
    }
}
