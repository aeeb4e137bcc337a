//! Asynchronous client for the Globe derivatives exchange
//!
//! Market data and account updates stream over one WebSocket connection and
//! are routed to per-channel handlers by a single receive loop. Orders are
//! sent over the same connection; history and account snapshots come from the
//! REST API.
//!
//! ```rust,no_run
//! use globe_client::{handler, GlobeClient, GlobeConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), globe_client::GlobeError> {
//! let client = Arc::new(GlobeClient::new(GlobeConfig::read_only())?);
//! client.connect().await?;
//! client
//!     .subscribe_depth("XBTUSD", Some(handler(|message: serde_json::Value| async move {
//!         println!("{}", message);
//!     })))
//!     .await?;
//! client.run_loop().await
//! # }
//! ```
pub mod core;
pub mod exchanges;

pub use crate::core::{
    config::{Credentials, GlobeConfig},
    errors::GlobeError,
    traits::{handler, MessageHandler, SharedHandler},
    types::{OrderType, Resolution, Side},
};
pub use crate::exchanges::globe::{
    AuthHeaders, Channel, DispatchOutcome, GlobeClient, Order, RoutingKey, Subscription,
};
