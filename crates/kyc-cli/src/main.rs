//! # kyc CLI entry point
//!
//! Parses command-line arguments, resolves configuration, initializes
//! logging and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kyc_cli::call::{run_call, CallArgs};
use kyc_cli::config::CliConfig;
use kyc_cli::deploy::{run_deploy, DeployArgs};
use kyc_cli::inspect::{run_digest, run_history, HistoryArgs};
use kyc_cli::query::{run_query, QueryArgs};
use kyc_cli::replay::{run_replay, ReplayArgs};

/// KYC lending stack CLI
///
/// Maintains a local ledger holding the identity registry and the loan
/// service. Calls are submitted as an explicit sender and journaled with
/// their outcome.
#[derive(Parser, Debug)]
#[command(name = "kyc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger state file. Overrides the config file and `KYC_STATE_FILE`.
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new ledger state file.
    Deploy(DeployArgs),

    /// Submit a mutating call as a sender.
    Call(CallArgs),

    /// Run a read-only query.
    Query(QueryArgs),

    /// Replay a YAML or JSON transaction script.
    Replay(ReplayArgs),

    /// List the receipt journal.
    History(HistoryArgs),

    /// Print the canonical state digest.
    Digest,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };
    if let Some(state) = &cli.state {
        config.state_file = state.clone();
    }
    config.log_json |= cli.log_json;

    init_tracing(cli.verbose, config.log_json);

    tracing::debug!(
        state_file = %config.state_file.display(),
        "kyc CLI v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let result = match &cli.command {
        Commands::Deploy(args) => run_deploy(args, &config),
        Commands::Call(args) => run_call(args, &config),
        Commands::Query(args) => run_query(args, &config),
        Commands::Replay(args) => run_replay(args, &config),
        Commands::History(args) => run_history(args, &config),
        Commands::Digest => run_digest(&config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
