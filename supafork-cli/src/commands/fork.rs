//! Fork command - copy a repository's migration history into a database

use std::io::Write;

use clap::Args;
use supafork_core::{migrations, Config};
use supafork_db::TargetDatabase;
use supafork_github::parse_repository_name;

use super::check::ConnectionArgs;
use super::github_client;
use super::redacted_target;

/// Arguments for the fork command
#[derive(Args, Debug)]
pub struct ForkArgs {
    /// Repository to fork from (owner/repo or GitHub URL)
    pub repository: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Apply only these migration files, in the given order (repeatable)
    #[arg(long = "select", value_name = "PATH")]
    pub select: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl ForkArgs {
    /// Execute the fork command
    ///
    /// Runs the full pipeline: verify the repository, validate the target
    /// connection, fetch migration contents and apply them in order.
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let full_name = parse_repository_name(&self.repository)?;
        let database_url = self.connection.resolve()?;
        let target = redacted_target(&database_url);

        let title = format!("Forking {} into {}", full_name, target);
        println!("{}", title);
        println!("{}", "=".repeat(title.len()));
        println!();

        let client = github_client(config)?;
        if verbose {
            println!("GitHub API: {}", client.api_base());
        }

        println!("Verifying repository...");
        let verified = client.verify_repository(&full_name).await?;
        println!(
            "  ✓ {} (default branch: {})",
            verified.repository.full_name, verified.repository.default_branch
        );
        let files = verified.listing.blob_paths();
        println!(
            "  ✓ {} with {} files",
            migrations::MIGRATIONS_DIR,
            files.len()
        );
        if verified.listing.truncated {
            println!("  ⚠️  Listing was truncated by GitHub; some files may be missing.");
        }

        println!("Validating database connection...");
        let db = TargetDatabase::new(&database_url);
        db.validate().await?;
        println!("  ✓ Connection validated");
        println!();

        let selection = migrations::resolve_selection(
            &files,
            (!self.select.is_empty()).then_some(self.select.as_slice()),
        )?;

        if selection.is_empty() {
            println!("No migration files to apply.");
            return Ok(());
        }

        println!("Migrations to apply ({}):", selection.len());
        for (i, path) in selection.iter().enumerate() {
            println!("  {:>3}. {}", i + 1, path);
        }
        println!();

        if !self.yes {
            let prompt = format!("Apply {} migrations to {}?", selection.len(), target);
            if !confirm(&prompt)? {
                println!("Aborted.");
                return Ok(());
            }
        }

        println!("Fetching migration contents...");
        let blobs = client.fetch_migrations(&verified.listing).await?;
        println!("  ✓ {} files fetched", blobs.len());

        println!("Applying migrations...");
        let outcome = db.apply_migrations(&selection, &blobs).await?;

        for path in &outcome.applied {
            println!("  ✓ {}", path);
        }

        match outcome.failure {
            None => {
                println!();
                println!(
                    "✓ Forked {} migrations into {}",
                    outcome.applied.len(),
                    target
                );
                Ok(())
            }
            Some(failure) => {
                println!("  ✗ {}: {}", failure.path, failure.reason);
                for path in selection.iter().skip(outcome.applied.len() + 1) {
                    println!("  - {} (not attempted)", path);
                }
                println!();
                println!(
                    "Applied {} of {} migrations before stopping.",
                    outcome.applied.len(),
                    selection.len()
                );
                anyhow::bail!("Migration {} failed: {}", failure.path, failure.reason)
            }
        }
    }
}

/// Ask for confirmation on stdin
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let answer = line.trim();

    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
