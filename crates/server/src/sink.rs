//! WebSocket message sink

use axum::extract::ws::{Message, WebSocket};
use contracts::{BatchMessage, ContractError, MessageSink};
use futures::stream::SplitSink;
use futures::SinkExt;

/// Write half of an upgraded socket; one Text frame per batch
pub struct WsSink {
    name: String,
    sender: SplitSink<WebSocket, Message>,
}

impl WsSink {
    pub fn new(name: impl Into<String>, sender: SplitSink<WebSocket, Message>) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }
}

impl MessageSink for WsSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, message: &BatchMessage) -> Result<(), ContractError> {
        let text = serde_json::to_string(message)
            .map_err(|e| ContractError::Serialization(e.to_string()))?;

        self.sender
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.sender
            .close()
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}
