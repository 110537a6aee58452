// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palaver history` command implementation.

use std::io::IsTerminal;

use palaver_config::PalaverConfig;
use palaver_core::PalaverError;
use palaver_render::Sanitizer;

use crate::view;

/// Prints the persisted log for the configured storage key.
pub async fn run_history(config: &PalaverConfig, plain: bool) -> Result<(), PalaverError> {
    if plain || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let mut store = palaver_storage::open_message_store(&config.storage).await;
    let records = store.load().await;
    if records.is_empty() {
        println!("no saved messages under `{}`", config.storage.storage_key);
    } else {
        let sanitizer = Sanitizer::new();
        for record in records {
            println!("{}", view::format_record(&sanitizer, record));
        }
    }

    store.kv().shutdown().await
}
