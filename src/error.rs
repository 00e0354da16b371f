//! Error types for slowandarain.

use crate::storage::StoreOp;
use std::io;
use thiserror::Error;

/// Result type alias for slowandarain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in slowandarain operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local storage I/O error.
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// HTTP transport error talking to a remote service.
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Sign-in or session failure. Never distinguishes the cause to users.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A row operation against the content store failed.
    #[error("{op} failed: {message}")]
    Store {
        /// Which operation failed.
        op: StoreOp,
        /// Backend-provided reason.
        message: String,
    },

    /// An image upload failed (including key collisions).
    #[error("Upload failed: {0}")]
    Upload(String),

    /// A mutating action was attempted without an admin session.
    #[error("Admin session required")]
    NotAdmin,

    /// Invalid state encountered (e.g. saving while no draft is being edited).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A save for the same entity is already running.
    #[error("Save already in progress for {0}")]
    SaveInFlight(String),

    /// Entity not found in the committed list.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feedback relay rejected the submission.
    #[error("Feedback submission failed: {0}")]
    Feedback(String),

    /// Interactive prompt failed (e.g. no terminal).
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl Error {
    /// Build a store error for the given operation.
    pub fn store(op: StoreOp, message: impl Into<String>) -> Self {
        Self::Store {
            op,
            message: message.into(),
        }
    }
}
