//! iplens CLI - image similarity search from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{CatalogCommand, CompareCommand, ConfigCommand, HealthCommand, SearchCommand};

/// iplens CLI - search a vector index for images similar to a query image.
///
/// Configuration is stored in ~/.iplens/iplens/ and supports multiple contexts,
/// similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "iplens")]
#[command(about = "Image similarity search CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.iplens/iplens/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Search for images similar to a query image
    Search(SearchCommand),
    /// Search, then compare the query with one candidate
    Compare(CompareCommand),
    /// Search the IP asset catalog
    Catalog(CatalogCommand),
    /// Check that the search server is up
    Health(HealthCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Search(cmd) => cmd.run(&cli).await,
        Commands::Compare(cmd) => cmd.run(&cli).await,
        Commands::Catalog(cmd) => cmd.run(&cli).await,
        Commands::Health(cmd) => cmd.run(&cli).await,
    }
}
