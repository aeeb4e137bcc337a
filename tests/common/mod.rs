#![allow(dead_code)]

use async_trait::async_trait;
use globe_client::core::errors::GlobeError;
use globe_client::core::kernel::{RestClient, WsReader, WsWriter};
use globe_client::{Credentials, GlobeClient, GlobeConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// base64("s3cr3t")
pub const TEST_SECRET: &str = "czNjcjN0";

/// Test configuration utilities
pub struct TestConfig;

impl TestConfig {
    /// Check if live API tests should run (talks to the real exchange)
    pub fn should_run_live_tests() -> bool {
        env::var("RUN_LIVE_TESTS").unwrap_or_default() == "true"
    }

    /// Get test timeout duration
    pub fn test_timeout_seconds() -> u64 {
        env::var("TEST_TIMEOUT_SECONDS")
            .unwrap_or_default()
            .parse()
            .unwrap_or(30)
    }

    pub fn credentials() -> Credentials {
        Credentials::new("k", "p", TEST_SECRET)
    }

    /// Try to create config from environment with fallback to read-only
    pub fn create_config_from_env(prefix: &str) -> GlobeConfig {
        GlobeConfig::from_env(prefix).unwrap_or_else(|_| GlobeConfig::read_only())
    }
}

pub fn short_timeout() -> Duration {
    Duration::from_secs(2)
}

/// One GET issued through `RecordingRest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
    pub authenticated: bool,
}

/// `RestClient` that records every call and answers from a canned table
#[derive(Debug, Clone, Default)]
pub struct RecordingRest {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    responses: Arc<Mutex<HashMap<String, String>>>,
}

impl RecordingRest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, endpoint: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), body.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RestClient for RecordingRest {
    async fn get_text(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<String, GlobeError> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_string(),
            params: query_params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            authenticated,
        });

        self.responses
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .ok_or_else(|| GlobeError::HttpError {
                status: 404,
                body: format!("no canned response for {}", endpoint),
            })
    }
}

type Inbound = Result<Message, GlobeError>;

pub struct FakeWriter {
    sent: mpsc::UnboundedSender<Message>,
    echo: mpsc::UnboundedSender<Inbound>,
    closed: bool,
}

#[async_trait]
impl WsWriter for FakeWriter {
    async fn send_raw(&mut self, msg: Message) -> Result<(), GlobeError> {
        if self.closed {
            return Err(GlobeError::SendError("fake socket closed".to_string()));
        }
        self.sent
            .send(msg)
            .map_err(|e| GlobeError::SendError(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), GlobeError> {
        self.closed = true;
        // A well-behaved server answers a close frame with its own
        let _ = self.echo.send(Ok(Message::Close(None)));
        Ok(())
    }
}

pub struct FakeReader {
    inbound: mpsc::UnboundedReceiver<Inbound>,
}

#[async_trait]
impl WsReader for FakeReader {
    async fn next_raw(&mut self) -> Option<Result<Message, GlobeError>> {
        match self.inbound.recv().await? {
            Ok(Message::Close(_)) => None,
            other => Some(other),
        }
    }
}

/// Server side of the in-memory transport
pub struct FakeServer {
    sent: mpsc::UnboundedReceiver<Message>,
    inbound: Option<mpsc::UnboundedSender<Inbound>>,
}

impl FakeServer {
    pub fn push_json(&self, value: &Value) {
        self.push(Message::Text(value.to_string()));
    }

    pub fn push_text(&self, text: &str) {
        self.push(Message::Text(text.to_string()));
    }

    pub fn push(&self, message: Message) {
        if let Some(inbound) = &self.inbound {
            inbound.send(Ok(message)).unwrap();
        }
    }

    /// Fail the stream with a transport error
    pub fn fail(&self, reason: &str) {
        if let Some(inbound) = &self.inbound {
            inbound
                .send(Err(GlobeError::TransportError(reason.to_string())))
                .unwrap();
        }
    }

    /// Close the stream from the server side
    pub fn hang_up(&mut self) {
        if let Some(inbound) = self.inbound.take() {
            let _ = inbound.send(Ok(Message::Close(None)));
        }
    }

    /// Next frame the client wrote, decoded as JSON
    pub async fn next_sent(&mut self) -> Value {
        let frame = tokio::time::timeout(short_timeout(), self.sent.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client writer dropped");
        match frame {
            Message::Text(text) => serde_json::from_str(&text).expect("client sent invalid JSON"),
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    /// Frames already written by the client, without waiting
    pub fn drain_sent(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(Message::Text(text)) = self.sent.try_recv() {
            frames.push(serde_json::from_str(&text).expect("client sent invalid JSON"));
        }
        frames
    }
}

pub fn fake_transport() -> (Box<dyn WsWriter>, Box<dyn WsReader>, FakeServer) {
    let (sent_tx, sent_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    let writer = FakeWriter {
        sent: sent_tx,
        echo: inbound_tx.clone(),
        closed: false,
    };
    let reader = FakeReader {
        inbound: inbound_rx,
    };
    let server = FakeServer {
        sent: sent_rx,
        inbound: Some(inbound_tx),
    };

    (Box::new(writer), Box::new(reader), server)
}

/// Client wired to an in-memory transport and a recording REST client
pub async fn connected_client(
    config: GlobeConfig,
) -> (Arc<GlobeClient<RecordingRest>>, RecordingRest, FakeServer) {
    let rest = RecordingRest::new();
    let client = GlobeClient::with_rest(config, rest.clone()).unwrap();
    let (writer, reader, server) = fake_transport();
    client.attach(writer, reader).await;
    (Arc::new(client), rest, server)
}

/// Same as `connected_client`, letting the caller configure the client first
pub async fn connect_with(
    client: GlobeClient<RecordingRest>,
) -> (Arc<GlobeClient<RecordingRest>>, FakeServer) {
    let (writer, reader, server) = fake_transport();
    client.attach(writer, reader).await;
    (Arc::new(client), server)
}
