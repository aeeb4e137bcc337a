use crate::core::errors::GlobeError;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument, warn};

type TungsteniteStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connection settings
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Handshake timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 30_000,
        }
    }
}

/// Write half of a WebSocket session
#[async_trait]
pub trait WsWriter: Send {
    /// Send one frame
    async fn send_raw(&mut self, msg: Message) -> Result<(), GlobeError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), GlobeError>;
}

/// Read half of a WebSocket session
#[async_trait]
pub trait WsReader: Send {
    /// Receive the next data frame; `None` once the peer has closed the stream
    async fn next_raw(&mut self) -> Option<Result<Message, GlobeError>>;
}

/// Tungstenite-based WebSocket transport
pub struct TungsteniteWs;

impl TungsteniteWs {
    /// Open a connection, attaching `headers` to the upgrade request
    ///
    /// The connection is split so frames can be written from any task while a
    /// single task drives the reader.
    #[instrument(skip_all, fields(exchange = "globe", url = %url, header_count = headers.len()))]
    pub async fn connect(
        url: &str,
        headers: &[(&'static str, String)],
        config: &WsConfig,
    ) -> Result<(TungsteniteWriter, TungsteniteReader), GlobeError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| GlobeError::ConnectionError(format!("Invalid WebSocket URL: {}", e)))?;

        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                GlobeError::ConnectionError(format!("Invalid header name {}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                GlobeError::ConnectionError(format!("Invalid header value for {}: {}", name, e))
            })?;
            request.headers_mut().insert(name, value);
        }

        let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
        let (ws_stream, response) = tokio::time::timeout(connect_timeout, connect_async(request))
            .await
            .map_err(|_| {
                GlobeError::ConnectionError(format!(
                    "WebSocket connection timeout after {}ms",
                    config.connect_timeout_ms
                ))
            })?
            .map_err(|e| GlobeError::ConnectionError(format!("WebSocket connection failed: {}", e)))?;

        debug!(status = %response.status(), "WebSocket handshake complete");

        let (write, read) = ws_stream.split();
        Ok((
            TungsteniteWriter {
                write,
                closed: false,
            },
            TungsteniteReader { read },
        ))
    }
}

pub struct TungsteniteWriter {
    write: SplitSink<TungsteniteStream, Message>,
    closed: bool,
}

#[async_trait]
impl WsWriter for TungsteniteWriter {
    async fn send_raw(&mut self, msg: Message) -> Result<(), GlobeError> {
        if self.closed {
            return Err(GlobeError::SendError("WebSocket is closed".to_string()));
        }

        self.write.send(msg).await.map_err(|e| {
            self.closed = true;
            GlobeError::SendError(format!("Failed to send WebSocket message: {}", e))
        })
    }

    async fn close(&mut self) -> Result<(), GlobeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Err(e) = self.write.send(Message::Close(None)).await {
            warn!("Failed to send close frame: {}", e);
        }
        Ok(())
    }
}

pub struct TungsteniteReader {
    read: SplitStream<TungsteniteStream>,
}

#[async_trait]
impl WsReader for TungsteniteReader {
    async fn next_raw(&mut self) -> Option<Result<Message, GlobeError>> {
        loop {
            match self.read.next().await {
                // Pongs to pings are queued by tungstenite itself
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "WebSocket closed by peer");
                    return None;
                }
                Some(Ok(message)) => return Some(Ok(message)),
                Some(Err(e)) => {
                    return Some(Err(GlobeError::TransportError(format!(
                        "WebSocket error: {}",
                        e
                    ))))
                }
                None => return None,
            }
        }
    }
}
