//! Session - per-connection merge loop

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use broadcaster::Broadcaster;
use contracts::{MessageSink, Sample, ServerConfig};
use futures::stream::{self, Stream, StreamExt};
use observability::{RunningStats, StatsSummary};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::StreamMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::batch::PendingBatch;
use crate::report::{SessionId, SessionOutcome, SessionReport, SessionState};
use crate::subscriptions::SubscriptionSet;

/// `Some(sample)` per queued item, then a single `None` once the queue closes
type SeriesStream = Pin<Box<dyn Stream<Item = Option<Sample>> + Send>>;

/// Floor for the flush period; tokio intervals reject zero
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_nanos(1);

/// Session tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Tick period between flushes
    pub flush_interval: Duration,
    /// Capacity of each per-series subscriber queue
    pub queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl SessionConfig {
    /// Clamp both knobs to values the runtime accepts
    pub fn normalized(self) -> Self {
        Self {
            flush_interval: self.flush_interval.max(MIN_FLUSH_INTERVAL),
            queue_capacity: self.queue_capacity.max(1),
        }
    }
}

impl From<&ServerConfig> for SessionConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            flush_interval: config.flush_interval,
            queue_capacity: config.queue_capacity,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    ticks: u64,
    flushes: u64,
    samples_sent: u64,
    batch_sizes: RunningStats,
}

/// One client connection joined to every series
pub struct Session<S> {
    id: SessionId,
    config: SessionConfig,
    series: Vec<String>,
    streams: StreamMap<usize, SeriesStream>,
    subscriptions: SubscriptionSet<Sample>,
    sink: S,
    state: SessionState,
}

impl<S: MessageSink> Session<S> {
    /// Subscribe a fresh bounded queue on every broadcaster, in order
    ///
    /// The message layout follows the order of `broadcasters`.
    pub fn join(broadcasters: &[Arc<Broadcaster<Sample>>], sink: S, config: SessionConfig) -> Self {
        let config = config.normalized();
        let id = SessionId::new();
        let mut subscriptions = SubscriptionSet::new();
        let mut streams = StreamMap::with_capacity(broadcasters.len());
        let mut series = Vec::with_capacity(broadcasters.len());

        for (index, broadcaster) in broadcasters.iter().enumerate() {
            let (queue, receiver) = async_channel::bounded(config.queue_capacity);
            subscriptions.push(Arc::clone(broadcaster), broadcaster.subscribe(queue));
            series.push(broadcaster.series().to_string());

            let stream: SeriesStream =
                Box::pin(receiver.map(Some).chain(stream::once(async { None })));
            streams.insert(index, stream);
        }

        debug!(session = %id, series = ?series, "Session joined");

        Self {
            id,
            config,
            series,
            streams,
            subscriptions,
            sink,
            state: SessionState::Active,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Effective tuning after clamping
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Joined series, in message order
    pub fn series(&self) -> &[String] {
        &self.series
    }

    /// Merge loop until a queue closes, a write fails or `disconnect` fires
    ///
    /// Subscriptions are released and the sink closed before returning.
    #[instrument(name = "session_run", skip_all, fields(session = %self.id))]
    pub async fn run(mut self, disconnect: CancellationToken) -> SessionReport {
        observability::record_session_opened();
        info!(
            session = %self.id,
            series = ?self.series,
            flush_interval = ?self.config.flush_interval,
            "Session active"
        );

        let period = self.config.flush_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut pending = PendingBatch::new(self.series.len());
        let mut counters = Counters::default();

        let outcome = loop {
            tokio::select! {
                biased;

                _ = disconnect.cancelled() => break SessionOutcome::Disconnected,

                _ = ticker.tick() => {
                    counters.ticks += 1;
                    if pending.is_empty() {
                        continue;
                    }

                    let message = pending.take(&self.series);
                    // A peer that stops reading must not pin the session.
                    let written = tokio::select! {
                        biased;
                        _ = disconnect.cancelled() => break SessionOutcome::Disconnected,
                        result = self.sink.write(&message) => result,
                    };
                    if let Err(e) = written {
                        warn!(session = %self.id, sink = self.sink.name(), error = %e, "Write failed");
                        observability::record_write_failed(self.sink.name());
                        break SessionOutcome::WriteFailed { message: e.to_string() };
                    }

                    let sent = message.sample_count();
                    counters.flushes += 1;
                    counters.samples_sent += sent as u64;
                    counters.batch_sizes.push(sent as f64);
                    observability::record_batch_flushed(sent);
                }

                Some((index, item)) = self.streams.next() => match item {
                    Some(sample) => pending.push(index, sample),
                    None => {
                        let series = self.series[index].clone();
                        debug!(session = %self.id, series = %series, "Subscriber queue closed");
                        break SessionOutcome::QueueClosed { series };
                    }
                },
            }
        };

        self.transition(SessionState::Closing, &outcome);

        let released = self.subscriptions.release();
        if let Err(e) = self.sink.close().await {
            debug!(session = %self.id, error = %e, "Sink close failed");
        }

        self.transition(SessionState::Terminated, &outcome);
        observability::record_session_closed(
            outcome.label(),
            counters.flushes,
            counters.samples_sent,
        );
        info!(
            session = %self.id,
            outcome = %outcome,
            ticks = counters.ticks,
            flushes = counters.flushes,
            samples_sent = counters.samples_sent,
            released,
            "Session terminated"
        );

        SessionReport {
            id: self.id,
            outcome,
            ticks: counters.ticks,
            flushes: counters.flushes,
            samples_sent: counters.samples_sent,
            state: self.state,
            batch_sizes: StatsSummary::from(&counters.batch_sizes),
        }
    }

    fn transition(&mut self, next: SessionState, outcome: &SessionOutcome) {
        if next <= self.state {
            return;
        }
        debug!(
            session = %self.id,
            from = %self.state,
            to = %next,
            outcome = %outcome,
            "Session state change"
        );
        self.state = next;
    }
}
