//! Supafork GitHub - Source repository access for Supafork
//!
//! This crate provides the read-only half of the fork pipeline: verifying
//! that a repository exposes a non-empty `supabase/migrations` directory and
//! fetching the directory's file contents.

mod client;
mod error;
mod fetch;
mod verify;

pub use client::{parse_repository_name, GitHubClient};
pub use error::{Error, Result};
pub use verify::VerifiedRepository;
