//! Entities shared across the fork pipeline
//!
//! These types describe a source repository's migration directory and the
//! outcome of replaying it: what was listed, what was fetched, and what was
//! applied. They are plain data and carry no connection or client handles.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{Error, Result};

/// Identity of a verified source repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// Canonical "owner/repo" name as reported by the host
    pub full_name: String,

    /// Default branch the migration history is read from
    pub default_branch: String,
}

/// Kind of a directory entry in the migrations listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    Blob,
    /// Nested directory
    Tree,
    /// Anything else (submodules, symlinks); listed but never fetched
    Other,
}

/// One entry of the migrations directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Path relative to the migrations directory
    pub path: String,

    /// Entry kind
    pub kind: EntryKind,

    /// Content-addressed object id of the entry
    pub object_id: String,

    /// API URL the entry's content can be fetched from, when the host
    /// provides one (submodule entries may not carry a URL)
    pub content_url: Option<String>,

    /// Size in bytes, reported for files only
    pub size: Option<u64>,
}

/// The migrations directory of a repository, as listed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationListing {
    /// Object id of the directory itself
    pub root_object_id: String,

    /// API URL the listing was fetched from
    pub source_url: String,

    /// Entries in the order the host returned them
    pub entries: Vec<DirectoryEntry>,

    /// Whether the host truncated the listing
    pub truncated: bool,
}

impl MigrationListing {
    /// Entries that are regular files, in listing order
    pub fn blob_entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Blob)
    }

    /// Paths of the file entries, in listing order
    pub fn blob_paths(&self) -> Vec<String> {
        self.blob_entries().map(|e| e.path.clone()).collect()
    }
}

/// Content of one migration file, still in transport encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationBlob {
    /// Path of the file this content belongs to, relative to the
    /// migrations directory
    pub path: String,

    /// Encoded content as returned by the host
    pub content: String,

    /// Transport encoding of `content` ("base64" or "utf-8")
    pub encoding: String,
}

impl MigrationBlob {
    /// Decode the transport-encoded content into raw bytes
    ///
    /// The encoding field is authoritative. GitHub serves blob content as
    /// base64 with embedded line breaks, which are stripped before decoding.
    pub fn decoded_bytes(&self) -> Result<Vec<u8>> {
        match self.encoding.as_str() {
            "base64" => {
                let compact: String = self
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                STANDARD.decode(compact).map_err(|e| Error::Decode {
                    path: self.path.clone(),
                    reason: format!("invalid base64: {}", e),
                })
            }
            "utf-8" | "utf8" => Ok(self.content.clone().into_bytes()),
            other => Err(Error::Decode {
                path: self.path.clone(),
                reason: format!("unsupported encoding: {}", other),
            }),
        }
    }

    /// Decode the content into SQL text
    pub fn decoded_text(&self) -> Result<String> {
        let bytes = self.decoded_bytes()?;
        String::from_utf8(bytes).map_err(|e| Error::Decode {
            path: self.path.clone(),
            reason: format!("content is not valid UTF-8: {}", e),
        })
    }
}

/// Result of a migration run
///
/// A stopped run is not an error at this level: the outcome records how far
/// the run got, and the caller decides how to render that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Paths of the migrations that were applied, in execution order
    pub applied: Vec<String>,

    /// The failure that stopped the run, if any
    pub failure: Option<ExecutionFailure>,
}

impl ExecutionOutcome {
    /// Whether every selected migration was applied
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }
}

/// The first (and only) failure of a migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    /// Path of the migration that failed
    pub path: String,

    /// Human-readable cause
    pub reason: String,
}
