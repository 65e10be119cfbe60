//! MessageSink trait - Session output interface
//!
//! The transport boundary: a session only needs to write framed messages and
//! close the connection.

use crate::{BatchMessage, ContractError};

/// Framed message output trait
///
/// Implemented by transport adapters (WebSocket) and by test doubles.
#[trait_variant::make(MessageSink: Send)]
pub trait LocalMessageSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one batched message
    ///
    /// # Errors
    /// Any error is fatal to the owning session
    async fn write(&mut self, message: &BatchMessage) -> Result<(), ContractError>;

    /// Close the underlying connection
    async fn close(&mut self) -> Result<(), ContractError>;
}
