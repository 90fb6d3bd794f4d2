//! Error types for Supafork

use thiserror::Error;

/// Result type alias for Supafork operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Supafork operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Migration content could not be decoded
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    /// A selected migration is not present in the repository listing
    #[error("Unknown migration: {0}")]
    UnknownMigration(String),

    /// A migration was selected more than once
    #[error("Migration selected more than once: {0}")]
    DuplicateSelection(String),
}
