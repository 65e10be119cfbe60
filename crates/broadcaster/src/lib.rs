//! # Broadcaster
//!
//! Single-producer / multi-consumer fan-out of one series.
//!
//! 负责：
//! - Consume the series' source queue in arrival order
//! - Fan-out every sample to all currently registered subscriber queues
//! - Isolate slow subscribers: a full queue drops the sample for that
//!   subscriber only, never blocking the others or the source
//!
//! ```text
//!   source queue ──► delivery loop ──► try_send ──► [queue A] ──► session A
//!                                          ├──────► [queue B] ──► session B
//!                                          └──────► [queue C]  (full: dropped)
//! ```

pub mod broadcaster;
pub mod metrics;
pub mod subscriber;

pub use broadcaster::{Broadcaster, DeliveryReport};
pub use metrics::{BroadcastMetrics, MetricsSnapshot};
pub use subscriber::SubscriptionId;
