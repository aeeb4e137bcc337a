//! Transport kernel: exchange-agnostic REST and WebSocket plumbing
//!
//! - `RestClient` / `ReqwestRest`: HTTP GET with optional request signing
//! - `WsWriter` / `WsReader` / `TungsteniteWs`: a split WebSocket session
//! - `Signer`: pluggable request authentication, plus the HMAC primitive and
//!   the process-wide nonce source
//! - `WsCodec`: exchange-specific frame encoding and decoding
//!
//! The kernel never retries and never reconnects; every failure is returned
//! to the caller of the operation that hit it.
pub mod codec;
pub mod rest;
pub mod signer;
pub mod ws;

pub use codec::WsCodec;
pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use signer::{
    current_millis, decode_secret, sign, NonceGenerator, RequestDescriptor, SignedHeaders, Signer,
    PROCESS_NONCE,
};
pub use ws::{TungsteniteReader, TungsteniteWriter, TungsteniteWs, WsConfig, WsReader, WsWriter};
