//! SampleSource trait - sample generator abstraction
//!
//! Decouples broadcasters from the concrete generator. The source owns a
//! bounded queue and pushes samples into it in production order.

use async_channel::Receiver;

use crate::{ContractError, Sample};

/// Sample data source trait
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn SampleSource> = Box::new(TickerSource::new(config));
/// let rx = source.start(5000)?;
/// let (broadcaster, _task) = Broadcaster::spawn(source.series(), rx);
/// // ... serve clients ...
/// source.stop();
/// ```
pub trait SampleSource: Send + Sync {
    /// Series this source produces
    fn series(&self) -> &str;

    /// Start producing into a fresh bounded queue and return its consumer end
    ///
    /// # Errors
    /// Returns an error if the source is already running.
    fn start(&self, capacity: usize) -> Result<Receiver<Sample>, ContractError>;

    /// Stop producing; the queue is closed once the producer task exits
    fn stop(&self);

    /// Check if currently producing
    fn is_running(&self) -> bool;
}
