//! # Call Subcommand
//!
//! Submits one mutating call to the ledger as `--sender` and persists the
//! result. The receipt is printed as JSON. A rejected call is journaled
//! like any other; the command then exits with [`EXIT_REJECTED`].

use anyhow::Result;
use clap::{Args, Subcommand};

use kyc_core::{LoanId, Principal};
use kyc_state::{Call, KycStatus, Receipt};

use crate::config::CliConfig;
use crate::store;

/// Exit code reported when the ledger rejected a call.
pub const EXIT_REJECTED: u8 = 2;

/// Arguments for the `kyc call` subcommand.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Principal submitting the call.
    #[arg(long)]
    pub sender: Principal,

    #[command(subcommand)]
    pub op: CallOp,
}

/// Mutating entry points.
#[derive(Subcommand, Debug)]
pub enum CallOp {
    /// Register the sender's identity.
    RegisterIdentity,

    /// Authorize a verifier (owner only).
    AddVerifier {
        /// Principal to authorize.
        verifier: Principal,
    },

    /// Revoke a verifier (owner only).
    RemoveVerifier {
        /// Principal to revoke.
        verifier: Principal,
    },

    /// Set a subject's KYC status (verifier only).
    UpdateKycStatus {
        /// Subject to update.
        subject: Principal,
        /// One of: unverified, pending, verified, rejected.
        status: KycStatus,
    },

    /// Set a subject's credit score (verifier only).
    UpdateCreditScore {
        /// Subject to update.
        subject: Principal,
        /// Score in [0, 850].
        #[arg(allow_negative_numbers = true)]
        score: i64,
    },

    /// Apply for a loan as the sender.
    ApplyForLoan {
        /// Requested amount; must be positive.
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },

    /// Approve a pending loan (verifier only).
    ApproveLoan {
        /// Loan application id.
        id: u64,
    },

    /// Reject a pending loan (verifier only).
    RejectLoan {
        /// Loan application id.
        id: u64,
    },
}

impl CallOp {
    /// The ledger call this operation submits.
    pub fn to_call(&self) -> Call {
        match self {
            Self::RegisterIdentity => Call::RegisterIdentity,
            Self::AddVerifier { verifier } => Call::AddAuthorizedVerifier {
                verifier: verifier.clone(),
            },
            Self::RemoveVerifier { verifier } => Call::RemoveAuthorizedVerifier {
                verifier: verifier.clone(),
            },
            Self::UpdateKycStatus { subject, status } => Call::UpdateKycStatus {
                subject: subject.clone(),
                status: *status,
            },
            Self::UpdateCreditScore { subject, score } => Call::UpdateCreditScore {
                subject: subject.clone(),
                score: *score,
            },
            Self::ApplyForLoan { amount } => Call::ApplyForLoan { amount: *amount },
            Self::ApproveLoan { id } => Call::ApproveLoan { id: LoanId(*id) },
            Self::RejectLoan { id } => Call::RejectLoan { id: LoanId(*id) },
        }
    }
}

/// Execute the call subcommand.
pub fn run_call(args: &CallArgs, config: &CliConfig) -> Result<u8> {
    let mut envelope = store::load(&config.state_file)?;
    let receipt = envelope.ledger.submit(args.sender.clone(), args.op.to_call());
    store::save(&config.state_file, &mut envelope)?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(exit_code(&receipt))
}

/// Process exit code for a receipt.
pub fn exit_code(receipt: &Receipt) -> u8 {
    if receipt.outcome.is_ok() {
        0
    } else {
        EXIT_REJECTED
    }
}
