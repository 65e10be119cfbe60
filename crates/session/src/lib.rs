//! # Session
//!
//! Per-connection merge of every series into periodic batched messages.
//!
//! 负责：
//! - Subscribe one bounded queue per broadcaster on join
//! - Accumulate samples per series between ticks
//! - Flush one `BatchMessage` per non-empty tick through a `MessageSink`
//! - Release every subscription exactly once on any exit path
//!
//! ```text
//!   [queue a] ─┐
//!   [queue b] ─┼─► PendingBatch ──tick──► MessageSink::write
//!   [queue c] ─┘
//! ```

mod batch;
mod report;
mod session;
mod subscriptions;

pub use batch::PendingBatch;
pub use report::{SessionId, SessionOutcome, SessionReport, SessionState};
pub use session::{Session, SessionConfig, MIN_FLUSH_INTERVAL};
pub use subscriptions::SubscriptionSet;
