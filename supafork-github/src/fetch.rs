//! Migration content fetching
//!
//! Fetches every file of a verified migration listing, a bounded number of
//! requests at a time. The result is all-or-nothing: one blob per file entry
//! or an error naming the first file that could not be retrieved. On failure
//! the remaining in-flight requests are abandoned.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use supafork_core::types::{DirectoryEntry, MigrationBlob, MigrationListing};

use crate::client::{ApiReply, BlobResponse, GitHubClient};
use crate::{Error, Result};

impl GitHubClient {
    /// Fetch the content of every file entry in the listing
    ///
    /// Non-file entries (nested directories, submodules) are skipped. The
    /// returned blobs are in listing order regardless of completion order.
    pub async fn fetch_migrations(&self, listing: &MigrationListing) -> Result<Vec<MigrationBlob>> {
        let entries: Vec<DirectoryEntry> = listing.blob_entries().cloned().collect();
        if entries.is_empty() {
            debug!("Listing has no file entries, nothing to fetch");
            return Ok(Vec::new());
        }

        debug!(
            count = entries.len(),
            concurrency = self.fetch_concurrency(),
            "Fetching migration contents"
        );

        let semaphore = Arc::new(Semaphore::new(self.fetch_concurrency()));
        let mut tasks: JoinSet<Result<MigrationBlob>> = JoinSet::new();

        for entry in entries.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let client = self.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::Other("Fetch semaphore closed".to_string()))?;
                client.fetch_blob(entry).await
            });
        }

        let mut by_path: HashMap<String, MigrationBlob> = HashMap::with_capacity(entries.len());
        while let Some(joined) = tasks.join_next().await {
            // Dropping the JoinSet on early return aborts the remaining tasks
            let blob = joined
                .map_err(|e| Error::Other(format!("Fetch task failed: {}", e)))??;
            by_path.insert(blob.path.clone(), blob);
        }

        let blobs = into_listing_order(&entries, by_path)?;

        info!(count = blobs.len(), "Fetched migration contents");
        Ok(blobs)
    }

    /// Fetch one blob; every failure is reported against the entry's path
    async fn fetch_blob(&self, entry: DirectoryEntry) -> Result<MigrationBlob> {
        let Some(ref url) = entry.content_url else {
            return Err(Error::BlobFetch {
                path: entry.path,
                reason: "entry has no content URL".to_string(),
            });
        };

        match self.get::<BlobResponse>(url).await {
            Ok(ApiReply::Payload(blob)) => Ok(MigrationBlob {
                path: entry.path,
                content: blob.content,
                encoding: blob.encoding,
            }),
            Ok(ApiReply::ApiError(message)) => Err(Error::BlobFetch {
                path: entry.path,
                reason: message,
            }),
            Err(e) => Err(Error::BlobFetch {
                path: entry.path,
                reason: e.to_string(),
            }),
        }
    }
}

/// Restore listing order over completion order, requiring exactly one blob
/// per expected entry
fn into_listing_order(
    entries: &[DirectoryEntry],
    mut by_path: HashMap<String, MigrationBlob>,
) -> Result<Vec<MigrationBlob>> {
    let mut blobs = Vec::with_capacity(entries.len());
    for entry in entries {
        let blob = by_path.remove(&entry.path).ok_or_else(|| Error::BlobFetch {
            path: entry.path.clone(),
            reason: "no content returned for entry".to_string(),
        })?;
        blobs.push(blob);
    }
    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use supafork_core::types::EntryKind;

    fn entry(path: &str) -> DirectoryEntry {
        DirectoryEntry {
            path: path.to_string(),
            kind: EntryKind::Blob,
            object_id: format!("sha-{}", path),
            content_url: Some(format!("https://api.example.com/blobs/{}", path)),
            size: Some(10),
        }
    }

    fn blob(path: &str) -> MigrationBlob {
        MigrationBlob {
            path: path.to_string(),
            content: "c2VsZWN0IDE7".to_string(),
            encoding: "base64".to_string(),
        }
    }

    #[test]
    fn test_into_listing_order() {
        let entries = vec![entry("a.sql"), entry("b.sql"), entry("c.sql")];

        // Completion order differs from listing order
        let mut by_path = HashMap::new();
        by_path.insert("c.sql".to_string(), blob("c.sql"));
        by_path.insert("a.sql".to_string(), blob("a.sql"));
        by_path.insert("b.sql".to_string(), blob("b.sql"));

        let blobs = into_listing_order(&entries, by_path).unwrap();
        let paths: Vec<&str> = blobs.iter().map(|b| b.path.as_str()).collect();
        assert_eq!(paths, vec!["a.sql", "b.sql", "c.sql"]);
    }

    #[test]
    fn test_into_listing_order_missing_entry() {
        let entries = vec![entry("a.sql"), entry("b.sql")];

        let mut by_path = HashMap::new();
        by_path.insert("a.sql".to_string(), blob("a.sql"));

        let err = into_listing_order(&entries, by_path).unwrap_err();
        match err {
            Error::BlobFetch { path, .. } => assert_eq!(path, "b.sql"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
