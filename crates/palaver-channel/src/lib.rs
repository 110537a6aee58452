// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket channel adapter for Palaver.
//!
//! Implements [`ChatChannel`] over `tokio-tungstenite`: one socket per
//! conversation at `<endpoint>/<conversation_id>`, UTF-8 text frames with no
//! envelope. A reader task forwards inbound frames into a queue drained by
//! [`ChatChannel::receive`].

pub mod frame;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use palaver_config::model::ConnectionConfig;
use palaver_core::{
    AdapterType, ChatChannel, ConversationId, HealthStatus, PalaverError, PluginAdapter,
};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::Inbound;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Inbound frames buffered between the reader task and `receive`.
const INBOUND_CAPACITY: usize = 256;

/// How long `close` waits for the close frame to be written.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// WebSocket channel adapter implementing [`ChatChannel`].
pub struct WsChannel {
    endpoint: String,
    connect_timeout: Duration,
    writer: Option<Mutex<WsSink>>,
    inbound_rx: Mutex<Option<mpsc::Receiver<Inbound>>>,
    reader_handle: Option<JoinHandle<()>>,
    live: Arc<AtomicBool>,
    connection_id: Option<Uuid>,
}

impl WsChannel {
    /// Creates an unopened channel for the configured endpoint.
    pub fn new(config: &ConnectionConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            connect_timeout: config.connect_timeout(),
            writer: None,
            inbound_rx: Mutex::new(None),
            reader_handle: None,
            live: Arc::new(AtomicBool::new(false)),
            connection_id: None,
        }
    }

    /// The socket URL for `conversation_id`.
    pub fn url_for(&self, conversation_id: &ConversationId) -> String {
        conversation_url(&self.endpoint, conversation_id)
    }
}

/// Joins the endpoint and conversation id with exactly one `/`.
pub fn conversation_url(endpoint: &str, conversation_id: &ConversationId) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        conversation_id.as_str()
    )
}

#[async_trait]
impl PluginAdapter for WsChannel {
    fn name(&self) -> &str {
        "websocket"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        if self.is_open() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("websocket is not connected".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        debug!("websocket channel shutting down");
        self.live.store(false, Ordering::SeqCst);
        if let Some(handle) = &self.reader_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChatChannel for WsChannel {
    async fn open(&mut self, conversation_id: &ConversationId) -> Result<(), PalaverError> {
        if self.is_open() {
            return Ok(());
        }

        let url = self.url_for(conversation_id);
        let (stream, _response) =
            tokio::time::timeout(self.connect_timeout, tokio_tungstenite::connect_async(url.as_str()))
                .await
                .map_err(|_| PalaverError::Timeout {
                    duration: self.connect_timeout,
                })?
                .map_err(|e| PalaverError::connection(format!("failed to connect to {url}"), e))?;

        let connection_id = Uuid::new_v4();
        let (sink, mut source) = stream.split();
        let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
        let live = self.live.clone();
        live.store(true, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            while let Some(result) = source.next().await {
                let inbound = match result {
                    Ok(message) => frame::classify(message),
                    Err(e) => Some(Inbound::Ended(format!("websocket error: {e}"))),
                };
                let Some(inbound) = inbound else { continue };
                let ended = matches!(inbound, Inbound::Ended(_));
                if ended {
                    live.store(false, Ordering::SeqCst);
                }
                if tx.send(inbound).await.is_err() {
                    debug!(%connection_id, "inbound queue closed, stopping reader");
                    break;
                }
                if ended {
                    break;
                }
            }
            live.store(false, Ordering::SeqCst);
        });

        self.writer = Some(Mutex::new(sink));
        *self.inbound_rx.get_mut() = Some(rx);
        self.reader_handle = Some(handle);
        self.connection_id = Some(connection_id);
        info!(%connection_id, %url, "websocket connected");
        Ok(())
    }

    async fn send(&self, text: &str) -> Result<(), PalaverError> {
        let writer = match (&self.writer, self.is_open()) {
            (Some(writer), true) => writer,
            _ => return Err(PalaverError::NotConnected),
        };
        writer
            .lock()
            .await
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| PalaverError::connection("failed to send frame", e))?;
        debug!(bytes = text.len(), "frame sent");
        Ok(())
    }

    async fn receive(&self) -> Result<String, PalaverError> {
        let mut guard = self.inbound_rx.lock().await;
        let rx = guard.as_mut().ok_or(PalaverError::NotConnected)?;
        match rx.recv().await {
            Some(Inbound::Frame(text)) => Ok(text),
            Some(Inbound::Ended(reason)) => Err(PalaverError::Connection {
                message: reason,
                source: None,
            }),
            None => Err(PalaverError::Connection {
                message: "websocket stream ended".into(),
                source: None,
            }),
        }
    }

    async fn close(&mut self) {
        self.live.store(false, Ordering::SeqCst);
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }
        *self.inbound_rx.get_mut() = None;

        if let Some(writer) = self.writer.take() {
            let mut sink = writer.into_inner();
            let closing = async {
                let _ = sink.send(Message::Close(None)).await;
                let _ = sink.close().await;
            };
            if tokio::time::timeout(CLOSE_GRACE, closing).await.is_err() {
                warn!("timed out sending websocket close frame");
            }
        }

        if let Some(connection_id) = self.connection_id.take() {
            info!(%connection_id, "websocket closed");
        }
    }

    fn is_open(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        if let Some(handle) = &self.reader_handle {
            handle.abort();
        }
    }
}
