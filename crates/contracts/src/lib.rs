//! # Contracts
//!
//! Frozen interface contracts shared by every wavecast crate: the sample and
//! batch data model, the source/sink seams and the streamer configuration.
//! Business crates depend on this crate only, never on each other's internals.
//!
//! ## Time Model
//! - `Sample::timestamp` is Unix-epoch nanoseconds taken when the sample is generated
//! - Ordering is per series only; series are joined at flush time

mod config;
mod error;
mod message;
mod sample;
mod sample_source;
mod sink;

pub use config::*;
pub use error::*;
pub use message::*;
pub use sample::*;
pub use sample_source::SampleSource;
pub use sink::*;
