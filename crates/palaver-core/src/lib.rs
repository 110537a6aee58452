// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Palaver chat client.
//!
//! This crate provides the message record model, the error type, and the
//! adapter traits implemented by the channel and storage crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PalaverError;
pub use types::{
    AdapterType, ContentKind, ConversationId, HealthStatus, MessageRecord, Position, Rendered,
};

pub use traits::{ChatChannel, KvStore, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palaver_error_has_all_variants() {
        let _config = PalaverError::Config("test".into());
        let _connection = PalaverError::Connection {
            message: "test".into(),
            source: None,
        };
        let _not_connected = PalaverError::NotConnected;
        let _persistence = PalaverError::Persistence {
            source: Box::new(std::io::Error::other("test")),
        };
        let _render = PalaverError::Render {
            message: "test".into(),
        };
        let _timeout = PalaverError::Timeout {
            duration: std::time::Duration::from_secs(10),
        };
        let _internal = PalaverError::Internal("test".into());
    }

    #[test]
    fn only_config_and_internal_errors_are_fatal() {
        assert!(!PalaverError::Config("x".into()).is_recoverable());
        assert!(!PalaverError::Internal("x".into()).is_recoverable());
        assert!(PalaverError::NotConnected.is_recoverable());
        assert!(PalaverError::persistence(std::io::Error::other("disk")).is_recoverable());
        assert!(
            PalaverError::connection("refused", std::io::Error::other("refused"))
                .is_recoverable()
        );
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Storage] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_chat_channel<T: ChatChannel>() {}
        fn _assert_kv_store<T: KvStore>() {}
    }
}
