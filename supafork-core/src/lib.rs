//! Supafork Core - Shared entities and configuration
//!
//! This crate provides the data model and configuration handling shared by
//! the GitHub, database and CLI layers of Supafork.

pub mod config;
pub mod error;
pub mod migrations;
pub mod secrets;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use secrets::Secrets;
