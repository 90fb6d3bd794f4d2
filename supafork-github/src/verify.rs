//! Repository verification
//!
//! Confirms that a repository exists and exposes a non-empty
//! `supabase/migrations` directory, and returns the directory listing that
//! later steps fetch and apply from. Read-only: nothing here touches the
//! target database.

use std::collections::HashSet;

use tracing::{debug, info};

use supafork_core::migrations::MIGRATIONS_DIR;
use supafork_core::types::{DirectoryEntry, MigrationListing, RepositoryRef};

use crate::client::{GitHubClient, TreeItem, TreeResponse};
use crate::{Error, Result};

/// A repository that passed verification, together with its migration listing
#[derive(Debug, Clone)]
pub struct VerifiedRepository {
    /// Canonical identity of the repository
    pub repository: RepositoryRef,

    /// Contents of the migrations directory
    pub listing: MigrationListing,
}

impl GitHubClient {
    /// Verify that a repository is forkable
    ///
    /// Checks, in order: the repository exists and is accessible, its default
    /// branch has a `supabase/migrations` directory, and that directory is
    /// not empty. The checks run against the default branch only.
    pub async fn verify_repository(&self, full_name: &str) -> Result<VerifiedRepository> {
        let meta = self.repository(full_name).await?;
        debug!(
            repository = %meta.full_name,
            branch = %meta.default_branch,
            "Repository exists, scanning default branch"
        );

        let root = self.tree(&meta.full_name, &meta.default_branch).await?;

        let dir = find_migrations_entry(&root.tree).ok_or(Error::MissingMigrationsDir)?;
        let dir_url = dir.url.as_deref().ok_or_else(|| {
            Error::Parse(format!("{} entry has no tree URL", MIGRATIONS_DIR))
        })?;

        let subtree = self.tree_by_url(dir_url).await?;
        let listing = build_listing(subtree)?;

        info!(
            repository = %meta.full_name,
            entries = listing.entries.len(),
            truncated = listing.truncated,
            "Repository verified"
        );

        Ok(VerifiedRepository {
            repository: RepositoryRef {
                full_name: meta.full_name,
                default_branch: meta.default_branch,
            },
            listing,
        })
    }
}

/// Find the migrations directory in a recursive root tree
///
/// The match is exact: the entry's path must equal the well-known directory
/// path and the entry must itself be a directory. A file that happens to be
/// named like the directory does not count.
fn find_migrations_entry(items: &[TreeItem]) -> Option<&TreeItem> {
    items
        .iter()
        .find(|item| item.path == MIGRATIONS_DIR && item.kind == "tree")
}

/// Build a listing from the migrations directory tree
fn build_listing(subtree: TreeResponse) -> Result<MigrationListing> {
    if subtree.tree.is_empty() {
        return Err(Error::EmptyMigrationsDir);
    }

    let mut seen = HashSet::new();
    for item in &subtree.tree {
        if !seen.insert(item.path.as_str()) {
            return Err(Error::Parse(format!(
                "Duplicate path in migrations listing: {}",
                item.path
            )));
        }
    }

    let entries: Vec<DirectoryEntry> = subtree
        .tree
        .into_iter()
        .map(DirectoryEntry::from)
        .collect();

    Ok(MigrationListing {
        root_object_id: subtree.sha,
        source_url: subtree.url,
        entries,
        truncated: subtree.truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use supafork_core::types::EntryKind;

    fn item(path: &str, kind: &str) -> TreeItem {
        TreeItem {
            path: path.to_string(),
            kind: kind.to_string(),
            sha: format!("sha-{}", path),
            url: Some(format!("https://api.example.com/git/{}", path)),
            size: if kind == "blob" { Some(100) } else { None },
        }
    }

    fn subtree(items: Vec<TreeItem>) -> TreeResponse {
        TreeResponse {
            sha: "dir-sha".to_string(),
            url: "https://api.example.com/git/trees/dir-sha".to_string(),
            tree: items,
            truncated: false,
        }
    }

    #[test]
    fn test_find_migrations_entry() {
        let items = vec![
            item("README.md", "blob"),
            item("supabase", "tree"),
            item("supabase/migrations", "tree"),
            item("supabase/migrations/20230101120000_init.sql", "blob"),
        ];

        let found = find_migrations_entry(&items).unwrap();
        assert_eq!(found.path, "supabase/migrations");
    }

    #[test]
    fn test_find_migrations_entry_absent() {
        let items = vec![item("README.md", "blob"), item("supabase", "tree")];
        assert!(find_migrations_entry(&items).is_none());
    }

    #[test]
    fn test_find_migrations_entry_rejects_file_with_directory_name() {
        let items = vec![item("supabase/migrations", "blob")];
        assert!(find_migrations_entry(&items).is_none());
    }

    #[test]
    fn test_build_listing() {
        let tree = subtree(vec![
            item("20230101120000_init.sql", "blob"),
            item("20230202130000_rls.sql", "blob"),
            item("helpers", "tree"),
        ]);

        let listing = build_listing(tree).unwrap();
        assert_eq!(listing.root_object_id, "dir-sha");
        assert_eq!(listing.entries.len(), 3);
        assert_eq!(listing.entries[0].kind, EntryKind::Blob);
        assert_eq!(listing.entries[2].kind, EntryKind::Tree);
        assert!(!listing.truncated);
    }

    #[test]
    fn test_build_listing_empty() {
        let err = build_listing(subtree(vec![])).unwrap_err();
        assert!(matches!(err, Error::EmptyMigrationsDir));
        assert_eq!(err.to_string(), "supabase/migrations folder is empty");
    }

    #[test]
    fn test_build_listing_rejects_duplicate_paths() {
        let tree = subtree(vec![
            item("20230101120000_init.sql", "blob"),
            item("20230101120000_init.sql", "blob"),
        ]);
        let err = build_listing(tree).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_build_listing_preserves_truncated_flag() {
        let mut tree = subtree(vec![item("20230101120000_init.sql", "blob")]);
        tree.truncated = true;

        let listing = build_listing(tree).unwrap();
        assert!(listing.truncated);
    }
}
