use crate::core::config::GlobeConfig;
use crate::core::errors::GlobeError;
use crate::core::kernel::{
    ReqwestRest, RequestDescriptor, RestClient, TungsteniteWs, WsCodec, WsConfig, WsReader,
    WsWriter,
};
use crate::core::traits::SharedHandler;
use crate::exchanges::globe::codec::GlobeCodec;
use crate::exchanges::globe::dispatcher::Dispatcher;
use crate::exchanges::globe::registry::HandlerRegistry;
use crate::exchanges::globe::rest::GlobeRestClient;
use crate::exchanges::globe::signer::{AuthHeaders, GlobeSigner};
use crate::exchanges::globe::types::{OutboundCommand, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub mod account;
pub mod market_data;
pub mod trading;

/// Client for the Globe WebSocket and REST APIs
///
/// One client owns one logical connection. Typical use: build, `connect`,
/// subscribe with handlers, then drive `run_loop` from a dedicated task while
/// other tasks place orders and call the REST getters. All methods take
/// `&self`, so the client can be shared behind an `Arc`.
pub struct GlobeClient<R: RestClient = ReqwestRest> {
    config: GlobeConfig,
    rest: GlobeRestClient<R>,
    signer: Option<Arc<GlobeSigner>>,
    registry: Arc<HandlerRegistry>,
    codec: GlobeCodec,
    writer: Mutex<Option<Box<dyn WsWriter>>>,
    reader: Mutex<Option<Box<dyn WsReader>>>,
    error_handler: Option<SharedHandler>,
    fallback_handler: Option<SharedHandler>,
    closing: AtomicBool,
}

impl GlobeClient<ReqwestRest> {
    /// Build a client with the default reqwest transport
    ///
    /// Fails with `InvalidSecretEncoding` if the configured secret is not
    /// valid base64.
    pub fn new(config: GlobeConfig) -> Result<Self, GlobeError> {
        crate::exchanges::globe::builder::build_client(config)
    }
}

impl<R: RestClient> GlobeClient<R> {
    /// Build a client around an existing REST client
    pub fn with_rest(config: GlobeConfig, rest: R) -> Result<Self, GlobeError> {
        config.validate()?;
        let signer = crate::exchanges::globe::builder::build_signer(&config)?;
        Ok(Self::from_parts(config, rest, signer))
    }

    pub(crate) fn from_parts(
        config: GlobeConfig,
        rest: R,
        signer: Option<Arc<GlobeSigner>>,
    ) -> Self {
        Self {
            config,
            rest: GlobeRestClient::new(rest),
            signer,
            registry: Arc::new(HandlerRegistry::new()),
            codec: GlobeCodec::new(),
            writer: Mutex::new(None),
            reader: Mutex::new(None),
            error_handler: None,
            fallback_handler: None,
            closing: AtomicBool::new(false),
        }
    }

    /// Handler for server frames that are not subscription pushes
    #[must_use]
    pub fn with_error_handler(mut self, handler: SharedHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Handler for pushes with no registered handler
    #[must_use]
    pub fn with_fallback_handler(mut self, handler: SharedHandler) -> Self {
        self.fallback_handler = Some(handler);
        self
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn rest(&self) -> &GlobeRestClient<R> {
        &self.rest
    }

    pub fn is_authenticated(&self) -> bool {
        self.signer.is_some()
    }

    pub async fn is_connected(&self) -> bool {
        self.writer.lock().await.is_some()
    }

    /// Open the WebSocket, authenticating the upgrade when credentials exist
    #[instrument(skip(self), fields(exchange = "globe", authenticated = self.signer.is_some()))]
    pub async fn connect(&self) -> Result<(), GlobeError> {
        let headers = match &self.signer {
            Some(signer) => signer
                .build(&RequestDescriptor::get(ws_path(&self.config.ws_url)))?
                .headers(),
            None => Vec::new(),
        };

        let ws_config = WsConfig {
            connect_timeout_ms: self.config.connect_timeout_ms,
        };
        let (writer, reader) = TungsteniteWs::connect(&self.config.ws_url, &headers, &ws_config).await?;

        self.attach(Box::new(writer), Box::new(reader)).await;
        info!("Connected to {}", self.config.ws_url);
        Ok(())
    }

    /// Install an already-open transport, replacing any previous one
    pub async fn attach(&self, writer: Box<dyn WsWriter>, reader: Box<dyn WsReader>) {
        self.closing.store(false, Ordering::Release);
        *self.writer.lock().await = Some(writer);
        *self.reader.lock().await = Some(reader);
    }

    /// Write one command frame
    ///
    /// The writer lock is held for the whole write, so concurrent sends never
    /// interleave on the wire.
    #[instrument(skip_all, fields(exchange = "globe", command = command.name()))]
    pub async fn send(&self, command: &OutboundCommand) -> Result<(), GlobeError> {
        let frame = self.codec.encode_command(command)?;
        let mut writer = self.writer.lock().await;
        match writer.as_mut() {
            Some(writer) => writer.send_raw(frame).await,
            None => Err(GlobeError::SendError("WebSocket not connected".to_string())),
        }
    }

    /// Subscribe to any channel, registering `handler` first when given
    #[instrument(skip(self, handler), fields(exchange = "globe", key = %subscription.routing_key()))]
    pub async fn subscribe(
        &self,
        subscription: Subscription,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        subscription.validate()?;
        if subscription.channel.is_private() && self.signer.is_none() {
            warn!("Subscribing to a private channel on an unauthenticated connection");
        }
        if let Some(handler) = handler {
            self.registry.register(subscription.routing_key(), handler);
        }
        self.send(&OutboundCommand::Subscribe(subscription)).await
    }

    /// Ask the server to stop a subscription; the local handler stays registered
    #[instrument(skip(self), fields(exchange = "globe", key = %subscription.routing_key()))]
    pub async fn unsubscribe(&self, subscription: Subscription) -> Result<(), GlobeError> {
        subscription.validate()?;
        self.send(&OutboundCommand::Unsubscribe(subscription)).await
    }

    /// Receive and dispatch frames until the connection ends
    ///
    /// Returns `Ok(())` when the connection ended after `close`, otherwise the
    /// `ConnectionClosed` or `TransportError` that stopped it.
    pub async fn run_loop(&self) -> Result<(), GlobeError> {
        let mut reader = self
            .reader
            .lock()
            .await
            .take()
            .ok_or_else(|| GlobeError::ConnectionError("WebSocket not connected".to_string()))?;

        let dispatcher = Dispatcher::new(Arc::clone(&self.registry))
            .with_error_handler(self.error_handler.clone())
            .with_fallback_handler(self.fallback_handler.clone());

        match dispatcher.run(reader.as_mut()).await {
            Err(GlobeError::ConnectionClosed) if self.closing.load(Ordering::Acquire) => {
                debug!("Receive loop finished after close");
                Ok(())
            }
            result => result,
        }
    }

    /// Close the connection; later sends fail with `SendError`
    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn close(&self) -> Result<(), GlobeError> {
        self.closing.store(true, Ordering::Release);
        let writer = self.writer.lock().await.take();
        match writer {
            Some(mut writer) => {
                writer.close().await?;
                info!("Connection closed");
            }
            None => warn!("Close requested but socket not connected"),
        }
        Ok(())
    }

    /// Authentication headers for `descriptor` with a fresh nonce
    pub fn auth_headers(&self, descriptor: &RequestDescriptor) -> Result<AuthHeaders, GlobeError> {
        self.ensure_authenticated()?.build(descriptor)
    }

    pub(crate) fn ensure_authenticated(&self) -> Result<&GlobeSigner, GlobeError> {
        self.signer
            .as_deref()
            .ok_or(GlobeError::MissingCredentials)
    }
}

impl<R: RestClient> std::fmt::Debug for GlobeClient<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobeClient")
            .field("ws_url", &self.config.ws_url)
            .field("rest_url", &self.config.rest_url)
            .field("authenticated", &self.signer.is_some())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Path component of a WebSocket URL, the part covered by the handshake signature
fn ws_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .find('/')
        .map_or("/", |index| &without_scheme[index..]);
    path.split(['?', '#']).next().unwrap_or(path)
}
