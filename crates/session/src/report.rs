//! Session identity, lifecycle and end-of-session report

use std::fmt;

use observability::StatsSummary;
use uuid::Uuid;

/// Unique id of one client session, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", self.0)
    }
}

/// Lifecycle: `Active -> Closing -> Terminated`, never backwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Active,
    Closing,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Closing => "closing",
            Self::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A subscribed queue reached end-of-stream
    QueueClosed { series: String },
    /// The sink rejected a write
    WriteFailed { message: String },
    /// The client went away
    Disconnected,
}

impl SessionOutcome {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            Self::QueueClosed { .. } => "queue_closed",
            Self::WriteFailed { .. } => "write_failed",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueClosed { series } => write!(f, "queue closed: {series}"),
            Self::WriteFailed { message } => write!(f, "write failed: {message}"),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Summary returned when `Session::run` finishes
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub id: SessionId,
    pub outcome: SessionOutcome,
    /// Ticks observed, including skipped ones
    pub ticks: u64,
    /// Messages successfully written
    pub flushes: u64,
    pub samples_sent: u64,
    pub state: SessionState,
    /// Samples per flushed message
    pub batch_sizes: StatsSummary,
}
