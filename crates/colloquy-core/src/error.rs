// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Colloquy dialogue engine.

use thiserror::Error;

/// The primary error type used across all Colloquy adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ColloquyError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport gateway errors (send failure, media download failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generation or embedding provider errors.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Speech-to-text or text-to-speech errors.
    #[error("speech error: {message}")]
    Speech {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An external call exceeded its time bound.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// An external call was abandoned because shutdown was requested.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid caller input (administrative requests, malformed values).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ColloquyError {
    /// Returns true when the error was caused by the caller's input rather
    /// than by a failing dependency.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ColloquyError::InvalidInput(_))
    }

    /// Wraps any storage-layer error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ColloquyError::Storage {
            source: Box::new(err),
        }
    }
}
