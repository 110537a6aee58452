// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palaver chat` command implementation.
//!
//! Launches an interactive REPL with readline history. Input is read on a
//! dedicated thread and handed to the conversation loop as intents; the
//! transcript is printed from the snapshots the loop publishes.

use chrono::{DateTime, Utc};
use colored::Colorize;
use palaver_agent::{
    ControllerOptions, ConversationController, ConversationSnapshot, Intent,
    install_signal_handler,
};
use palaver_channel::WsChannel;
use palaver_config::PalaverConfig;
use palaver_core::{PalaverError, Position};
use palaver_render::Sanitizer;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{mpsc, watch};

use crate::view;

/// Runs the `palaver chat` interactive REPL.
pub async fn run_chat(config: PalaverConfig) -> Result<(), PalaverError> {
    let conversation_id = config.connection.conversation_id();
    let store = palaver_storage::open_message_store(&config.storage).await;
    let channel = WsChannel::new(&config.connection);
    let mut controller = ConversationController::new(
        conversation_id.clone(),
        Box::new(channel),
        store,
        ControllerOptions::from(&config),
    );

    let (intent_tx, intent_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(ConversationSnapshot::default());
    let cancel = install_signal_handler();

    println!(
        "{}",
        format!("palaver - conversation {conversation_id}").bold().green()
    );
    println!("Type {} to exit.\n", "/quit".yellow());

    let session_start = Utc::now();
    spawn_input(intent_tx, format!("{}> ", config.agent.user_label.green()));

    let (result, ()) = tokio::join!(
        controller.run(intent_rx, snapshot_tx, cancel),
        print_transcript(snapshot_rx, &config.agent.assistant_label, session_start),
    );
    result?;

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Reads lines on a blocking thread until `/quit`, Ctrl+C, or Ctrl+D.
fn spawn_input(intents: mpsc::Sender<Intent>, prompt: String) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("{}: failed to initialize readline: {e}", "error".red());
                let _ = intents.blocking_send(Intent::Shutdown);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == "/quit" || trimmed == "/exit" {
                        break;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);
                    if intents.blocking_send(Intent::Submit(line)).is_err() {
                        return;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("{}: {e}", "error".red());
                    break;
                }
            }
        }
        let _ = intents.blocking_send(Intent::Shutdown);
    });
}

/// Prints new records, the typing indicator, and refused submits as
/// snapshots arrive. Ends when the conversation loop drops its sender.
///
/// Lines the user typed during this session are already on screen, so
/// outgoing records newer than `session_start` are not echoed.
async fn print_transcript(
    mut snapshots: watch::Receiver<ConversationSnapshot>,
    assistant_label: &str,
    session_start: DateTime<Utc>,
) {
    let sanitizer = Sanitizer::new();
    let mut printed = 0;
    let mut was_awaiting = false;
    let mut refusals = 0;

    loop {
        {
            let snapshot = snapshots.borrow_and_update();
            for record in snapshot.messages.iter().skip(printed) {
                if record.position == Position::Outgoing && record.timestamp >= session_start {
                    continue;
                }
                println!("{}", view::format_record(&sanitizer, record));
            }
            printed = snapshot.messages.len();

            if snapshot.awaiting_reply && !was_awaiting {
                println!("{}", format!("{assistant_label} is typing…").dimmed().italic());
            }
            was_awaiting = snapshot.awaiting_reply;

            if snapshot.refusals > refusals {
                if let Some(error) = &snapshot.last_error {
                    eprintln!("{}: {error}", "error".red());
                }
                refusals = snapshot.refusals;
            }
        }

        if snapshots.changed().await.is_err() {
            break;
        }
    }
}
