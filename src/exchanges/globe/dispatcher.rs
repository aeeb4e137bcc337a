use crate::core::errors::GlobeError;
use crate::core::kernel::{WsCodec, WsReader};
use crate::core::traits::SharedHandler;
use crate::exchanges::globe::codec::GlobeCodec;
use crate::exchanges::globe::registry::HandlerRegistry;
use crate::exchanges::globe::types::{InboundMessage, RoutingKey};
use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, instrument, warn};

/// What the dispatcher did with one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A registered handler ran to completion
    Routed(RoutingKey),
    /// Push with no registered handler (`None` for an unknown channel)
    Unrouted(Option<RoutingKey>),
    /// Frame without a `subscription` field, given to the error path
    OutOfBand,
    /// Frame could not be decoded
    Malformed,
    /// A handler panicked; the loop carried on
    HandlerPanicked(Option<RoutingKey>),
    /// Frame carried no application data
    Ignored,
}

/// Routes inbound frames to registered handlers, one frame at a time
pub struct Dispatcher {
    codec: GlobeCodec,
    registry: Arc<HandlerRegistry>,
    error_handler: Option<SharedHandler>,
    fallback_handler: Option<SharedHandler>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            codec: GlobeCodec::new(),
            registry,
            error_handler: None,
            fallback_handler: None,
        }
    }

    /// Handler for frames without a `subscription` field
    #[must_use]
    pub fn with_error_handler(mut self, handler: Option<SharedHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    /// Handler for pushes nobody registered for; the log sink when unset
    #[must_use]
    pub fn with_fallback_handler(mut self, handler: Option<SharedHandler>) -> Self {
        self.fallback_handler = handler;
        self
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Drive `reader` until the connection ends
    ///
    /// Each frame is fully handled, including awaiting its handler, before the
    /// next one is read. Reader errors that leave the session usable are
    /// logged and skipped. Returns `ConnectionClosed` when the peer closes the
    /// stream, or the transport error that ended it.
    #[instrument(skip_all, fields(exchange = "globe"))]
    pub async fn run<Rd>(&self, reader: &mut Rd) -> Result<(), GlobeError>
    where
        Rd: WsReader + ?Sized,
    {
        loop {
            match reader.next_raw().await {
                Some(Ok(frame)) => {
                    self.dispatch(frame).await;
                }
                Some(Err(e)) if e.is_fatal_to_session() => {
                    error!("Receive loop stopped: {}", e);
                    return Err(e);
                }
                Some(Err(e)) => {
                    warn!("Skipping unreadable frame: {}", e);
                }
                None => {
                    info!("Receive loop stopped: connection closed");
                    return Err(GlobeError::ConnectionClosed);
                }
            }
        }
    }

    /// Decode and route one frame
    pub async fn dispatch(&self, frame: Message) -> DispatchOutcome {
        match self.codec.decode_message(frame) {
            Ok(Some(message)) => self.route(message).await,
            Ok(None) => DispatchOutcome::Ignored,
            Err(e) => {
                error!("Dropping malformed message: {}", e);
                DispatchOutcome::Malformed
            }
        }
    }

    /// Route one decoded message
    pub async fn route(&self, message: InboundMessage) -> DispatchOutcome {
        match message {
            InboundMessage::Push { tag, message } => {
                let Some(key) = tag.routing_key() else {
                    return self.unrouted(None, message).await;
                };

                match self.registry.lookup(&key) {
                    Some(handler) => {
                        debug!(key = %key, "Routing push");
                        if invoke(&handler, message, &key.to_string()).await {
                            DispatchOutcome::Routed(key)
                        } else {
                            DispatchOutcome::HandlerPanicked(Some(key))
                        }
                    }
                    None => self.unrouted(Some(key), message).await,
                }
            }
            InboundMessage::Error(message) => match &self.error_handler {
                Some(handler) => {
                    if invoke(handler, message, "error handler").await {
                        DispatchOutcome::OutOfBand
                    } else {
                        DispatchOutcome::HandlerPanicked(None)
                    }
                }
                None => {
                    warn!(message = %message, "Globe error");
                    DispatchOutcome::OutOfBand
                }
            },
        }
    }

    async fn unrouted(&self, key: Option<RoutingKey>, message: Value) -> DispatchOutcome {
        match &self.fallback_handler {
            Some(handler) => {
                if !invoke(handler, message, "fallback handler").await {
                    return DispatchOutcome::HandlerPanicked(key);
                }
            }
            None => {
                info!(key = ?key.as_ref().map(ToString::to_string), message = %message, "Unrouted push");
            }
        }
        DispatchOutcome::Unrouted(key)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("has_error_handler", &self.error_handler.is_some())
            .field("has_fallback_handler", &self.fallback_handler.is_some())
            .finish()
    }
}

/// Run a handler, containing any panic; returns false if it panicked
async fn invoke(handler: &SharedHandler, message: Value, label: &str) -> bool {
    match AssertUnwindSafe(handler.handle(message)).catch_unwind().await {
        Ok(()) => true,
        Err(panic) => {
            error!(handler = label, "Handler panicked: {}", panic_message(&*panic));
            false
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
