//! `evidentia verify` — run the stateless verifier and optional policy
//! gate over a line-delimited-JSON evidence session.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use evidentia_policy::Policy;
use evidentia_verify::{verify, Status};

/// Arguments for the verify command
#[derive(Args)]
pub struct VerifyArgs {
    /// Path to a line-delimited-JSON session export. Reads stdin if omitted.
    #[arg(long, short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,

    /// Reject anything short of AUTHORITATIVE evidence
    #[arg(long)]
    require_authoritative: bool,

    /// Reject sessions signed by an SDK-local chain_authority
    #[arg(long)]
    reject_local_authority: bool,

    /// Reject sessions with no CHAIN_SEAL
    #[arg(long)]
    require_seal: bool,

    /// Reject sessions carrying any redacted payload value
    #[arg(long)]
    disallow_redacted: bool,

    /// Reject sessions whose total LOG_DROP count exceeds this
    #[arg(long, value_name = "N")]
    max_drops: Option<u64>,

    /// Print every recorded violation, not just the summary
    #[arg(long)]
    detailed: bool,
}

/// Run the verify command. Returns the process exit code:
/// 0 = PASS, 1 = structural fail without a fatal violation, 2 = fatal
/// integrity or policy failure, 3 = input load error.
pub fn run(args: VerifyArgs) -> Result<i32> {
    let bytes = read_input(args.input.as_ref())?;

    let report = verify(&bytes);
    let policy = Policy {
        require_authoritative: args.require_authoritative,
        reject_local_authority: args.reject_local_authority,
        require_seal: args.require_seal,
        allow_redacted: !args.disallow_redacted,
        max_drops: args.max_drops,
    };
    let gated = evidentia_policy::apply(&report, &policy);

    println!("{}", "evidentia verify".bold().cyan());
    println!("{}", "═".repeat(40).cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![Cell::new("Field").fg(Color::Cyan), Cell::new("Value").fg(Color::Cyan)]);
    table.add_row(vec!["session_id".to_string(), gated.session_id.clone().unwrap_or_else(|| "-".to_string())]);
    table.add_row(vec!["status".to_string(), gated.status.as_str().to_string()]);
    table.add_row(vec!["evidence_class".to_string(), gated.evidence_class.as_str().to_string()]);
    table.add_row(vec!["authority".to_string(), gated.authority.unwrap_or("-").to_string()]);
    table.add_row(vec!["sealed".to_string(), gated.sealed.to_string()]);
    table.add_row(vec!["complete".to_string(), gated.complete.to_string()]);
    table.add_row(vec!["total_drops".to_string(), gated.total_drops.to_string()]);
    table.add_row(vec!["contains_redacted".to_string(), gated.contains_redacted.to_string()]);
    table.add_row(vec!["replay_fingerprint".to_string(), gated.replay_fingerprint.clone()]);
    println!("{table}");

    if !gated.partial_reasons.is_empty() {
        println!();
        println!("{}", "Partial reasons:".bold());
        for reason in &gated.partial_reasons {
            println!("  {} {reason}", "•".yellow());
        }
    }

    if (args.detailed || gated.status == Status::Fail) && !gated.violations.is_empty() {
        println!();
        println!("{}", "Violations:".bold());
        for v in &gated.violations {
            println!("  {} [{}] {}", "✗".red(), v.error_code.as_str(), v.message);
        }
    }

    println!();
    match gated.status {
        Status::Pass => crate::print_success("session verified"),
        Status::Fail => crate::print_error("session failed verification"),
    }

    Ok(gated.exit_code())
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
