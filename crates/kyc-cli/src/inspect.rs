//! # History and Digest Subcommands
//!
//! Read-only views of the persisted ledger: the receipt journal and the
//! state digest.

use anyhow::Result;
use clap::Args;

use kyc_state::{Outcome, Receipt};

use crate::config::CliConfig;
use crate::store;

/// Arguments for the `kyc history` subcommand.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Print receipts as a JSON array instead of one line per call.
    #[arg(long)]
    pub json: bool,
}

/// Execute the history subcommand.
pub fn run_history(args: &HistoryArgs, config: &CliConfig) -> Result<u8> {
    let envelope = store::load(&config.state_file)?;
    let receipts = envelope.ledger.receipts();

    if args.json {
        println!("{}", serde_json::to_string_pretty(receipts)?);
        return Ok(0);
    }

    if receipts.is_empty() {
        println!("No calls recorded.");
        return Ok(0);
    }
    for receipt in receipts {
        println!("{}", format_receipt(receipt));
    }
    Ok(0)
}

/// One-line summary of a receipt.
pub fn format_receipt(receipt: &Receipt) -> String {
    let result = match &receipt.outcome {
        Outcome::Ok { .. } => "OK".to_string(),
        Outcome::Err {
            kind,
            code,
            message,
        } => format!("ERR {kind} ({code}): {message}"),
    };
    format!(
        "[{}] {} {} {} -> {result}",
        receipt.index,
        receipt.block_height,
        receipt.caller,
        receipt.call.name()
    )
}

/// Execute the digest subcommand.
pub fn run_digest(config: &CliConfig) -> Result<u8> {
    let envelope = store::load(&config.state_file)?;
    let digest = envelope.ledger.state_digest()?;
    println!("{digest}");
    Ok(0)
}
