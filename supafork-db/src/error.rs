//! Error types for target database operations

use thiserror::Error;

/// Target database error types
#[derive(Error, Debug)]
pub enum Error {
    /// The connection string does not parse as a Postgres URL
    #[error("Invalid connection string: {0}")]
    InvalidUrl(String),

    /// The database could not be reached
    #[error("Database unreachable: {0}")]
    Unreachable(String),

    /// The database rejected the credentials
    #[error("Database authentication failed: {0}")]
    AuthFailed(String),
}

/// Result type alias for target database operations
pub type Result<T> = std::result::Result<T, Error>;
