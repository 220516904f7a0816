//! WebSocket wire message types.

use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

use crate::error::WallexError;

/// Outbound subscription control frame: `{"action": ..., "channel": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionFrame {
    /// `subscribe` or `unsubscribe`.
    pub action: SubscriptionAction,
    /// Channel to act on.
    pub channel: String,
}

/// Action of a [`SubscriptionFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionAction {
    /// Start receiving the channel.
    Subscribe,
    /// Stop receiving the channel.
    Unsubscribe,
}

impl SubscriptionFrame {
    /// Build a subscribe frame.
    pub fn subscribe(channel: impl Into<String>) -> Self {
        Self {
            action: SubscriptionAction::Subscribe,
            channel: channel.into(),
        }
    }

    /// Build an unsubscribe frame.
    pub fn unsubscribe(channel: impl Into<String>) -> Self {
        Self {
            action: SubscriptionAction::Unsubscribe,
            channel: channel.into(),
        }
    }

    /// Serialize into a transport text message.
    pub fn to_message(&self) -> Result<Message, WallexError> {
        let json = serde_json::to_string(self)?;
        Ok(Message::Text(json.into()))
    }
}

/// A frame received from the exchange.
///
/// Data frames carry a channel name and a payload; error frames carry an
/// error code and message. Anything else fails to parse and is dropped by
/// the reader.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundFrame {
    /// Protocol-level error frame: `{"error": <code>, "message": <string>}`.
    Error {
        /// Error code; a string or a number depending on the failure.
        error: serde_json::Value,
        /// Human-readable message.
        #[serde(default)]
        message: Option<String>,
    },
    /// Channel data frame: `{"channel": <string>, "data": <payload>}`.
    Channel {
        /// Channel the payload belongs to.
        channel: String,
        /// The payload.
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl InboundFrame {
    /// Parse a raw text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
