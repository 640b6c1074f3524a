//! evidentia CLI — command-line entry point into the evidence core.
//!
//! ```bash
//! # Verify a session exported as line-delimited JSON
//! evidentia verify --input session.jsonl
//!
//! # Append a batch of proposed events to a local session
//! evidentia ingest --db evidentia.db --events batch.json --seal
//!
//! # Show build and crate information
//! evidentia info
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::{info, ingest, verify};

#[derive(Parser)]
#[command(
    name = "evidentia",
    version,
    about = "evidentia CLI — verification and ingestion for hash-chained evidence sessions",
    long_about = "evidentia records AI agent activity as a closed, hash-chained event log \
                  and verifies it independently of the code that wrote it.\n\n\
                  Every event links to the one before it by content hash; tampering with \
                  any event, in any position, invalidates the chain from that point forward."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify an evidence session's integrity
    #[command(name = "verify")]
    Verify(verify::VerifyArgs),

    /// Append a batch of proposed events to a session
    #[command(name = "ingest")]
    Ingest(ingest::IngestArgs),

    /// Show crate and build information
    #[command(name = "info")]
    Info(info::InfoArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Verify(args) => verify::run(args)?,
        Commands::Ingest(args) => ingest::run(args).await?,
        Commands::Info(args) => {
            info::run(args);
            0
        }
    };

    std::process::exit(exit_code);
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

#[allow(dead_code)]
pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}
