use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlobeError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Send error: {0}")]
    SendError(String),

    #[error("Missing credentials: authenticated call requires an API key, passphrase and secret")]
    MissingCredentials,

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Secret is not valid base64: {0}")]
    InvalidSecretEncoding(#[from] base64::DecodeError),

    #[error("HTTP error: {status} - {body}")]
    HttpError { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl GlobeError {
    /// Whether the error ends the WebSocket session
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::ConnectionClosed | Self::TransportError(_)
        )
    }
}
