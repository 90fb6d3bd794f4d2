//! Error types for GitHub operations

use supafork_core::migrations::MIGRATIONS_DIR;
use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while verifying a repository or fetching its
/// migration contents
#[derive(Error, Debug)]
pub enum Error {
    /// Repository does not exist or is not accessible; carries the message
    /// the API reported
    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    /// The repository has no migrations directory
    #[error("{} folder is missing", MIGRATIONS_DIR)]
    MissingMigrationsDir,

    /// The migrations directory exists but contains no entries
    #[error("{} folder is empty", MIGRATIONS_DIR)]
    EmptyMigrationsDir,

    /// The API reported an error for a request past the existence check
    /// (rate limiting, transient failures)
    #[error("GitHub API error: {0}")]
    Upstream(String),

    /// The content of one migration file could not be retrieved
    #[error("Failed to fetch {path}: {reason}")]
    BlobFetch { path: String, reason: String },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}
