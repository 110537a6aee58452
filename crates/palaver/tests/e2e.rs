// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: a real WebSocket server, the WebSocket channel, SQLite
//! persistence, and the conversation loop.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use palaver_agent::{ControllerOptions, ConversationController, ConversationSnapshot, Intent};
use palaver_channel::WsChannel;
use palaver_config::PalaverConfig;
use palaver_core::{ContentKind, Position};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

/// Replies to every text frame with a bold markdown echo, like the
/// assistant server streaming one chunk per reply.
async fn assistant_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Text(text) = msg {
                        let reply = format!("**{}!**", text.as_str());
                        if ws.send(Message::Text(reply.into())).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }
    });
    addr
}

fn config(addr: SocketAddr, dir: &std::path::Path) -> PalaverConfig {
    let mut config = PalaverConfig::default();
    config.connection.endpoint = format!("ws://{addr}/ws");
    config.connection.connect_timeout_secs = 5;
    config.storage.database_path = dir.join("e2e.db").to_string_lossy().to_string();
    config
}

struct Session {
    intents: mpsc::Sender<Intent>,
    snapshots: watch::Receiver<ConversationSnapshot>,
    task: tokio::task::JoinHandle<()>,
}

async fn start_session(config: &PalaverConfig) -> Session {
    let store = palaver_storage::open_message_store(&config.storage).await;
    let channel = WsChannel::new(&config.connection);
    let mut controller = ConversationController::new(
        config.connection.conversation_id(),
        Box::new(channel),
        store,
        ControllerOptions::from(config),
    );
    let (intents, intent_rx) = mpsc::channel(8);
    let (snapshot_tx, snapshots) = watch::channel(ConversationSnapshot::default());
    let task = tokio::spawn(async move {
        controller
            .run(intent_rx, snapshot_tx, CancellationToken::new())
            .await
            .unwrap();
    });
    Session {
        intents,
        snapshots,
        task,
    }
}

async fn wait_for(
    snapshots: &mut watch::Receiver<ConversationSnapshot>,
    pred: impl Fn(&ConversationSnapshot) -> bool,
) -> ConversationSnapshot {
    tokio::time::timeout(Duration::from_secs(10), snapshots.wait_for(|s| pred(s)))
        .await
        .expect("timed out waiting for snapshot")
        .expect("conversation loop ended")
        .clone()
}

#[tokio::test]
async fn submit_reply_and_restore_across_sessions() {
    let addr = assistant_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(addr, dir.path());

    let mut session = start_session(&config).await;
    wait_for(&mut session.snapshots, |s| s.connected).await;

    session
        .intents
        .send(Intent::Submit("Hi".into()))
        .await
        .unwrap();
    let snap = wait_for(&mut session.snapshots, |s| {
        s.messages.len() == 2 && !s.awaiting_reply
    })
    .await;
    assert_eq!(snap.messages[0].position, Position::Outgoing);
    assert_eq!(snap.messages[0].text, "Hi");
    assert_eq!(snap.messages[1].position, Position::Incoming);
    assert_eq!(snap.messages[1].content_kind, ContentKind::SafeHtml);
    assert!(snap.messages[1].text.contains("<strong>Hi!</strong>"));
    assert!(snap.durable);

    session.intents.send(Intent::Shutdown).await.unwrap();
    session.task.await.unwrap();

    let mut restored = start_session(&config).await;
    let snap = wait_for(&mut restored.snapshots, |s| s.connected).await;
    assert_eq!(snap.messages.len(), 2);
    assert_eq!(snap.messages[0].text, "Hi");
    assert!(snap.messages[1].text.contains("<strong>Hi!</strong>"));

    drop(restored.intents);
    restored.task.await.unwrap();
}

#[tokio::test]
async fn unreachable_server_shows_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dir = tempfile::tempdir().unwrap();
    let config = config(addr, dir.path());

    let mut session = start_session(&config).await;
    let snap = wait_for(&mut session.snapshots, |s| !s.messages.is_empty()).await;
    assert!(!snap.connected);
    assert_eq!(snap.messages[0].text, palaver_agent::CONNECTION_ERROR_NOTICE);
    assert_eq!(snap.messages[0].content_kind, ContentKind::PlainText);

    session
        .intents
        .send(Intent::Submit("Hello".into()))
        .await
        .unwrap();
    let snap = wait_for(&mut session.snapshots, |s| s.last_error.is_some()).await;
    assert_eq!(snap.messages.len(), 1);

    session.intents.send(Intent::Shutdown).await.unwrap();
    session.task.await.unwrap();
}
