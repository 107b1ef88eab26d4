//! Kaiwa - a chat client core
//!
//! This library provides the core functionality for Kaiwa, a mobile chat
//! client that talks to a remote dialogue (chat-bot) service. It covers the
//! session identity flow: registration with the remote service, at-rest
//! protection of the issued user identifier, and the request/response cycle
//! for dialogue turns. Presentation (screens, list adapters, image loading)
//! lives in the embedding application, not here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod context;
pub mod identity;
pub mod session;
pub mod task;
pub mod vault;

/// Result type alias for Kaiwa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Kaiwa operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network, timeout or HTTP-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Decrypt was requested before any key pair exists in the secure store
    #[error("No key pair available in the secure store")]
    KeyUnavailable,

    /// Ciphertext does not correspond to the held key pair
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Other cryptographic or secure-store operation error
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Storage operation error
    #[error("Storage error: {0}")]
    Storage(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// Initialize the Kaiwa library with logging
pub fn init() {
    tracing_subscriber::fmt::init();
}

#[cfg(test)]
mod tests;
