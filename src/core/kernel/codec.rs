use crate::core::errors::GlobeError;
use tokio_tungstenite::tungstenite::Message;

/// Codec trait for converting between raw WebSocket frames and typed messages
pub trait WsCodec: Send + Sync + 'static {
    /// Outbound command type
    type Command: Send + Sync;

    /// Inbound message type
    type Message: Send + Sync;

    /// Encode one command as one WebSocket frame
    fn encode_command(&self, command: &Self::Command) -> Result<Message, GlobeError>;

    /// Decode a raw WebSocket message into a typed message
    ///
    /// Control frames (ping, pong, close) are handled at the transport level.
    ///
    /// # Returns
    /// - `Ok(Some(message))` - Successfully decoded message
    /// - `Ok(None)` - Frame carries no application data
    /// - `Err(error)` - Failed to decode message
    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, GlobeError>;
}
