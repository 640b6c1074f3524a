//! `evidentia info` — crate and build metadata.

use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct InfoArgs;

pub fn run(_args: InfoArgs) {
    let version = env!("CARGO_PKG_VERSION");

    println!("{}", "evidentia — evidence core for AI agent event logs".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!();

    println!("{}", "Version:".bold());
    println!("  {} {}", "evidentia-cli:".dimmed(), version.green());
    println!("  {} {}", "schema_ver:".dimmed(), evidentia_model::SUPPORTED_SCHEMA_VERSIONS.join(", ").green());
    println!();

    println!("{}", "Guarantees:".bold());
    println!("  {} Closed, hash-chained, append-only event log", "•".cyan());
    println!("  {} Tamper detection independent of the ingestion path", "•".cyan());
    println!("  {} chain_authority excluded from the signed field set", "•".cyan());
    println!("  {} Zero-runtime-dependency verifier core", "•".cyan());
    println!();

    println!("{}", "Configuration:".bold());
    println!("  {} EVIDENTIA_AUTHORITY_ID", "•".blue());
    println!("  {} EVIDENTIA_LOCK_TIMEOUT_SECS", "•".blue());
    println!("  {} EVIDENTIA_MAX_LOG_DROPS_PER_SESSION", "•".blue());
    println!("  {} EVIDENTIA_MAX_LOG_DROPS_PER_MINUTE", "•".blue());
    println!();
}
