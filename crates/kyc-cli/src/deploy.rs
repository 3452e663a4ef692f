//! # Deploy Subcommand
//!
//! Creates a fresh ledger state file administered by the given owner.

use anyhow::{bail, Result};
use clap::Args;

use kyc_core::Principal;

use crate::config::CliConfig;
use crate::store::{self, StateEnvelope};

/// Arguments for the `kyc deploy` subcommand.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Principal that will manage the verifier set.
    #[arg(long)]
    pub owner: Principal,

    /// Overwrite an existing state file.
    #[arg(long)]
    pub force: bool,
}

/// Execute the deploy subcommand.
pub fn run_deploy(args: &DeployArgs, config: &CliConfig) -> Result<u8> {
    let path = &config.state_file;
    if path.exists() {
        if !args.force {
            bail!(
                "ledger state already exists at {} (pass --force to overwrite)",
                path.display()
            );
        }
        tracing::warn!(path = %path.display(), "overwriting existing ledger state");
    }

    let mut envelope = StateEnvelope::deploy(args.owner.clone());
    store::save(path, &mut envelope)?;

    println!("OK: deployed ledger owned by {} at {}", args.owner, path.display());
    Ok(0)
}
