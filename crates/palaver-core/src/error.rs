// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Palaver chat client.

use thiserror::Error;

/// The primary error type used across all Palaver adapter traits and core operations.
#[derive(Debug, Error)]
pub enum PalaverError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The channel could not be established or failed while open.
    #[error("connection error: {message}")]
    Connection {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A frame was sent before `open` or after `close`.
    #[error("channel is not connected")]
    NotConnected,

    /// Durable storage is unavailable, or a write failed.
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A payload could not be rendered; callers degrade to escaped text.
    #[error("render error: {message}")]
    Render { message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PalaverError {
    /// Builds a [`PalaverError::Connection`] from any error source.
    pub fn connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PalaverError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`PalaverError::Persistence`] from any error source.
    pub fn persistence<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PalaverError::Persistence {
            source: Box::new(source),
        }
    }

    /// Whether the session can keep running after this error.
    ///
    /// Only configuration and internal errors are fatal; everything else is
    /// surfaced to the user and the conversation continues.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PalaverError::Config(_) | PalaverError::Internal(_))
    }
}
