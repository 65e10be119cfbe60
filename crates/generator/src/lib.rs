//! # Generator
//!
//! Synthetic sample sources.
//!
//! Responsibilities:
//! - Evaluate the configured waveform at the current wall-clock time
//! - Produce one `Sample` per tick into a bounded source queue
//! - Start/stop a set of sources as one unit
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{SampleSource, SeriesConfig, Waveform};
//! use generator::TickerSource;
//!
//! let source = TickerSource::new(SeriesConfig::new("a", Waveform::Sine));
//! let rx = source.start(5000)?;
//! while let Ok(sample) = rx.recv().await {
//!     // fan out
//! }
//! ```

mod config;
mod error;
mod pool;
mod ticker;
mod waveform;

// Re-exports
pub use config::{GeneratorMetrics, MetricsSnapshot};
pub use contracts::Sample;
pub use error::{GeneratorError, Result};
pub use pool::SourcePool;
pub use ticker::{unix_nanos, TickerSource};
pub use waveform::evaluate;
