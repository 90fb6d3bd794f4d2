//! Fetch command - retrieve migration contents without applying them

use clap::Args;
use supafork_core::Config;
use supafork_github::parse_repository_name;

use super::{format_size, github_client};

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Repository to fetch from (owner/repo or GitHub URL)
    pub repository: String,

    /// Print each file's content
    #[arg(long)]
    pub show: bool,
}

impl FetchArgs {
    /// Execute the fetch command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let full_name = parse_repository_name(&self.repository)?;
        let client = github_client(config)?;

        if verbose {
            println!("Verifying {} via {}...", full_name, client.api_base());
        }

        let verified = client.verify_repository(&full_name).await?;
        if verified.listing.truncated {
            println!("⚠️  Listing was truncated by GitHub; some files may be missing.");
        }

        let blobs = client.fetch_migrations(&verified.listing).await?;
        if blobs.is_empty() {
            println!("No migration files to fetch.");
            return Ok(());
        }

        let mut decoded = Vec::with_capacity(blobs.len());
        for blob in &blobs {
            decoded.push((blob, blob.decoded_bytes()?));
        }
        let total: u64 = decoded.iter().map(|(_, bytes)| bytes.len() as u64).sum();

        println!(
            "Fetched {} migration files from {} ({})",
            blobs.len(),
            verified.repository.full_name,
            format_size(total)
        );
        println!();

        for (blob, bytes) in &decoded {
            println!(
                "  {:<44} {:>8} {:>10}",
                blob.path,
                blob.encoding,
                format_size(bytes.len() as u64)
            );

            if self.show {
                println!();
                for line in String::from_utf8_lossy(bytes).lines() {
                    println!("    {}", line);
                }
                println!();
            }
        }

        Ok(())
    }
}
