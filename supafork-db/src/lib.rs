//! Target database layer for Supafork
//!
//! Validates user-supplied connection strings and applies fetched migration
//! files. Nothing here persists state of its own: every operation opens a
//! connection, does its work and releases the connection before returning.

mod connect;
mod error;
mod executor;

pub use connect::{supabase_connection_url, TargetDatabase};
pub use error::{Error, Result};
