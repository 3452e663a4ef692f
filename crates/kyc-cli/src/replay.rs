//! # Replay Subcommand
//!
//! Runs a transaction script against the ledger. A script is a YAML or JSON
//! list of steps, each naming its sender next to the call fields:
//!
//! ```yaml
//! - sender: ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC
//!   op: apply-for-loan
//!   amount: 10000
//! - sender: ST2REHHS5J3CERCRBEPMGH7921Q6PYKAADT7JP2VB
//!   op: approve-loan
//!   id: 0
//! ```
//!
//! Rejected steps do not stop the replay; each is journaled and the command
//! exits with the rejection code if any step failed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use kyc_core::Principal;
use kyc_state::ScriptStep;

use crate::call::EXIT_REJECTED;
use crate::config::CliConfig;
use crate::store::{self, StateEnvelope};

/// Arguments for the `kyc replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Script file (`.yaml`, `.yml` or `.json`).
    pub script: PathBuf,

    /// Deploy a fresh ledger owned by this principal instead of loading the
    /// existing state file.
    #[arg(long)]
    pub owner: Option<Principal>,
}

/// Parse a script, choosing the format from the file extension.
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    let steps = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON script: {}", path.display()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML script: {}", path.display()))?,
        _ => bail!(
            "unsupported script format: {} (expected .yaml, .yml or .json)",
            path.display()
        ),
    };
    Ok(steps)
}

/// Execute the replay subcommand.
pub fn run_replay(args: &ReplayArgs, config: &CliConfig) -> Result<u8> {
    let steps = load_script(&args.script)?;

    let mut envelope = match &args.owner {
        Some(owner) => {
            if config.state_file.exists() {
                bail!(
                    "ledger state already exists at {}; drop --owner to replay onto it",
                    config.state_file.display()
                );
            }
            StateEnvelope::deploy(owner.clone())
        }
        None => store::load(&config.state_file)?,
    };

    tracing::info!(
        script = %args.script.display(),
        steps = steps.len(),
        "replaying script"
    );

    let mut rejected = 0usize;
    for step in steps {
        let receipt = envelope.ledger.submit(step.sender, step.call);
        if !receipt.outcome.is_ok() {
            rejected += 1;
        }
        println!("{}", serde_json::to_string(&receipt)?);
    }

    store::save(&config.state_file, &mut envelope)?;

    if rejected > 0 {
        tracing::warn!(rejected, "replay finished with rejected calls");
        Ok(EXIT_REJECTED)
    } else {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_core::LoanId;
    use kyc_state::{Call, LoanStatus};

    const OWNER: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
    const USER: &str = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC";
    const VERIFIER: &str = "ST2REHHS5J3CERCRBEPMGH7921Q6PYKAADT7JP2VB";

    fn lending_script() -> String {
        format!(
            "- sender: {USER}\n  op: register-identity\n\
             - sender: {OWNER}\n  op: add-authorized-verifier\n  verifier: {VERIFIER}\n\
             - sender: {USER}\n  op: apply-for-loan\n  amount: 10000\n\
             - sender: {VERIFIER}\n  op: approve-loan\n  id: 0\n"
        )
    }

    fn owner() -> Option<Principal> {
        Some(Principal::new(OWNER).unwrap())
    }

    #[test]
    fn yaml_script_on_fresh_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("flow.yaml");
        std::fs::write(&script, lending_script()).unwrap();
        let config = CliConfig::for_state_file(dir.path().join("ledger.json"));

        let args = ReplayArgs {
            script,
            owner: owner(),
        };
        assert_eq!(run_replay(&args, &config).unwrap(), 0);

        let envelope = store::load(&config.state_file).unwrap();
        let app = envelope
            .ledger
            .loans()
            .get_loan_application(LoanId(0))
            .unwrap();
        assert_eq!(app.status, LoanStatus::Approved);
        assert_eq!(envelope.ledger.receipts().len(), 4);
    }

    #[test]
    fn json_script_onto_existing_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::for_state_file(dir.path().join("ledger.json"));
        store::save(
            &config.state_file,
            &mut StateEnvelope::deploy(Principal::new(OWNER).unwrap()),
        )
        .unwrap();

        let script = dir.path().join("steps.json");
        std::fs::write(
            &script,
            format!(r#"[{{"sender": "{USER}", "op": "apply-for-loan", "amount": 0}}]"#),
        )
        .unwrap();

        let args = ReplayArgs {
            script,
            owner: None,
        };
        assert_eq!(run_replay(&args, &config).unwrap(), EXIT_REJECTED);

        let envelope = store::load(&config.state_file).unwrap();
        assert_eq!(envelope.ledger.receipts().len(), 1);
        assert_eq!(envelope.ledger.loans().next_loan_id(), LoanId(0));
    }

    #[test]
    fn negative_amount_step_is_journaled_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::for_state_file(dir.path().join("ledger.json"));
        let script = dir.path().join("flow.yaml");
        std::fs::write(
            &script,
            format!(
                "- sender: {USER}\n  op: apply-for-loan\n  amount: -5\n\
                 - sender: {USER}\n  op: apply-for-loan\n  amount: 50\n"
            ),
        )
        .unwrap();

        let args = ReplayArgs {
            script,
            owner: owner(),
        };
        assert_eq!(run_replay(&args, &config).unwrap(), EXIT_REJECTED);

        let envelope = store::load(&config.state_file).unwrap();
        let receipts = envelope.ledger.receipts();
        assert_eq!(receipts.len(), 2);
        assert_eq!(
            receipts[0].outcome.error_kind(),
            Some(kyc_core::ErrorKind::InvalidAmount)
        );
        assert!(receipts[1].outcome.is_ok());
        assert_eq!(
            envelope.ledger.loans().get_loan_application(LoanId(0)).unwrap().amount,
            50
        );
    }

    #[test]
    fn fresh_replay_refuses_existing_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::for_state_file(dir.path().join("ledger.json"));
        std::fs::write(&config.state_file, "{}").unwrap();
        let script = dir.path().join("flow.yaml");
        std::fs::write(&script, lending_script()).unwrap();

        let err = run_replay(
            &ReplayArgs {
                script,
                owner: owner(),
            },
            &config,
        )
        .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("flow.txt");
        std::fs::write(&script, "[]").unwrap();
        let err = load_script(&script).unwrap_err();
        assert!(err.to_string().contains("unsupported script format"));
    }

    #[test]
    fn unknown_op_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("bad.yaml");
        std::fs::write(&script, format!("- sender: {USER}\n  op: mint-tokens\n")).unwrap();
        assert!(load_script(&script).is_err());
    }

    #[test]
    fn script_step_parses_flattened_call() {
        let steps: Vec<ScriptStep> = serde_yaml::from_str(&lending_script()).unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].call, Call::RegisterIdentity);
        assert_eq!(steps[3].call, Call::ApproveLoan { id: LoanId(0) });
        assert_eq!(steps[3].sender.as_str(), VERIFIER);
    }
}
