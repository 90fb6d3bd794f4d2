//! Supafork CLI - Command line interface for Supafork
//!
//! Copies the schema migration history of a public GitHub repository into a
//! Postgres database you own.

mod commands;

use clap::{Parser, Subcommand};
use supafork_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CheckArgs, FetchArgs, ForkArgs, VerifyArgs};

/// Supafork: fork a repository's Supabase migrations into your own database
#[derive(Parser, Debug)]
#[command(name = "supafork")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// GitHub API base URL (overrides config and env)
    #[arg(long, global = true, env = "SUPAFORK_GITHUB_API")]
    api_base: Option<String>,

    /// Maximum concurrent content fetches (overrides config and env)
    #[arg(long, global = true, env = "SUPAFORK_FETCH_CONCURRENCY")]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Check that a repository has a forkable migration history
    #[command(visible_alias = "v")]
    Verify(VerifyArgs),

    /// Fetch migration contents without applying them
    Fetch(FetchArgs),

    /// Validate a database connection string
    Check(CheckArgs),

    /// Copy a repository's migrations into a target database
    #[command(visible_alias = "f")]
    Fork(ForkArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.api_base.clone(), cli.concurrency)?;

    if cli.verbose {
        tracing::info!(
            api_base = %config.github.api_base,
            fetch_concurrency = config.fork.fetch_concurrency,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("supafork {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Verify(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Fetch(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Check(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Fork(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Config) => {
            println!("Supafork Configuration");
            println!("======================");
            println!();
            println!("GitHub Settings:");
            println!("  api_base: {}", config.github.api_base);
            println!("  request_timeout: {:?}", config.github.request_timeout);
            println!();
            println!("Fork Settings:");
            println!("  fetch_concurrency: {}", config.fork.fetch_concurrency);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
            if let Some(path) = supafork_core::Secrets::default_secrets_path() {
                println!("Secrets file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - set GITHUB_TOKEN to authenticate)");
                }
            }
        }
        None => {
            println!("Supafork - Copy a repository's Supabase migrations into your own database");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
