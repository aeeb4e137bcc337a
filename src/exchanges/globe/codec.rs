use crate::core::errors::GlobeError;
use crate::core::kernel::WsCodec;
use crate::exchanges::globe::types::{InboundMessage, OutboundCommand, SubscriptionTag};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

/// JSON text-frame codec for the Globe WebSocket API
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobeCodec;

impl GlobeCodec {
    pub fn new() -> Self {
        Self
    }

    /// Classify a decoded JSON value as a push or an out-of-band message
    pub fn classify(value: Value) -> Result<InboundMessage, GlobeError> {
        let Some(subscription) = value.get("subscription") else {
            return Ok(InboundMessage::Error(value));
        };

        let tag: SubscriptionTag = serde_json::from_value(subscription.clone()).map_err(|e| {
            GlobeError::MalformedMessage(format!("Invalid subscription tag {}: {}", subscription, e))
        })?;

        Ok(InboundMessage::Push {
            tag,
            message: value,
        })
    }
}

impl WsCodec for GlobeCodec {
    type Command = OutboundCommand;
    type Message = InboundMessage;

    fn encode_command(&self, command: &Self::Command) -> Result<Message, GlobeError> {
        Ok(Message::Text(serde_json::to_string(command)?))
    }

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, GlobeError> {
        let text = match message {
            Message::Text(text) => text,
            Message::Binary(data) => String::from_utf8(data).map_err(|e| {
                GlobeError::MalformedMessage(format!("Invalid UTF-8 in binary message: {}", e))
            })?,
            _ => return Ok(None),
        };

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| GlobeError::MalformedMessage(format!("{}: {}", e, text)))?;

        Self::classify(value).map(Some)
    }
}
