// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-task event loop driving a [`ConversationController`].
//!
//! Intents from the view and frames from the channel are processed one at a
//! time, so records land in the order their triggering events were handled.
//! A fresh [`ConversationSnapshot`] is published after every event.

use palaver_core::PalaverError;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::controller::ConversationController;
use crate::intent::{ConversationSnapshot, Intent};

impl ConversationController {
    /// Runs the conversation until cancelled, told to shut down, or the
    /// intent sender is dropped.
    ///
    /// The loop starts the controller if needed. When the channel ends, a
    /// notice is appended and the loop keeps serving intents (submits are
    /// then refused) until it is stopped. The channel is closed on exit.
    pub async fn run(
        &mut self,
        mut intents: mpsc::Receiver<Intent>,
        snapshots: watch::Sender<ConversationSnapshot>,
        cancel: CancellationToken,
    ) -> Result<(), PalaverError> {
        self.start().await;
        let mut listening = self.can_submit();
        let mut last_error: Option<String> = None;
        let mut refusals: u64 = 0;
        self.publish(&snapshots, last_error.as_deref(), refusals);

        info!(conversation_id = %self.conversation_id(), "conversation loop running");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping conversation loop");
                    break;
                }
                intent = intents.recv() => {
                    match intent {
                        Some(Intent::Submit(text)) => {
                            last_error = match self.submit(&text).await {
                                Ok(()) => None,
                                Err(e) => {
                                    refusals += 1;
                                    warn!(error = %e, refusals, "submit refused");
                                    Some(e.to_string())
                                }
                            };
                        }
                        Some(Intent::Draft(text)) => self.set_draft(text),
                        Some(Intent::Shutdown) => {
                            debug!("shutdown requested by view");
                            break;
                        }
                        None => {
                            debug!("intent sender dropped");
                            break;
                        }
                    }
                }
                frame = self.next_frame(), if listening => {
                    match frame {
                        Ok(payload) => self.on_frame(&payload).await,
                        Err(e) => {
                            listening = false;
                            self.on_channel_ended(&e).await;
                        }
                    }
                }
            }
            self.publish(&snapshots, last_error.as_deref(), refusals);
        }

        self.close().await;
        self.publish(&snapshots, last_error.as_deref(), refusals);
        info!(conversation_id = %self.conversation_id(), "conversation loop stopped");
        Ok(())
    }

    fn publish(
        &self,
        snapshots: &watch::Sender<ConversationSnapshot>,
        last_error: Option<&str>,
        refusals: u64,
    ) {
        let mut snapshot = self.snapshot();
        snapshot.last_error = last_error.map(str::to_owned);
        snapshot.refusals = refusals;
        snapshots.send_replace(snapshot);
    }
}
