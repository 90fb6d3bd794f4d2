//! Verify command - check a repository for a migration history

use clap::Args;
use supafork_core::types::EntryKind;
use supafork_core::{migrations, Config};
use supafork_github::parse_repository_name;

use super::{format_size, github_client};

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Repository to check (owner/repo or GitHub URL)
    pub repository: String,
}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let full_name = parse_repository_name(&self.repository)?;
        let client = github_client(config)?;

        if verbose {
            println!("Verifying {} via {}...", full_name, client.api_base());
        }

        let verified = client.verify_repository(&full_name).await?;
        let repo = &verified.repository;
        let listing = &verified.listing;

        println!();
        println!("{}", repo.full_name);
        println!("{}", "=".repeat(repo.full_name.len()));
        println!();
        println!("Default branch: {}", repo.default_branch);
        println!(
            "Migrations: {} ({} entries)",
            migrations::MIGRATIONS_DIR,
            listing.entries.len()
        );
        println!();

        for entry in &listing.entries {
            match entry.kind {
                EntryKind::Blob => {
                    let when = migrations::timestamp(&entry.path)
                        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    let size = entry.size.map(format_size).unwrap_or_default();
                    println!("  {:<44} {:>20} {:>10}", entry.path, when, size);
                }
                EntryKind::Tree => println!("  {:<44} (directory)", entry.path),
                EntryKind::Other => println!("  {:<44} (skipped)", entry.path),
            }
        }

        println!();
        let files = listing.blob_paths().len();
        println!(
            "{} migration file{} found.",
            files,
            if files == 1 { "" } else { "s" }
        );

        if listing.truncated {
            println!("⚠️  Listing was truncated by GitHub; some files may be missing.");
        }

        Ok(())
    }
}
