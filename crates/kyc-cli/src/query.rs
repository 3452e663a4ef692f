//! # Query Subcommand
//!
//! Read-only lookups against the persisted ledger. Output is the bare JSON
//! value, `null` when the record does not exist. Queries never modify the
//! state file.

use anyhow::Result;
use clap::{Args, Subcommand};

use kyc_core::{LoanId, Principal};
use kyc_state::Query;

use crate::config::CliConfig;
use crate::store;

/// Arguments for the `kyc query` subcommand.
#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub op: QueryOp,
}

/// Read-only entry points.
#[derive(Subcommand, Debug)]
pub enum QueryOp {
    /// Identity record of a subject.
    Identity {
        /// Subject to look up.
        subject: Principal,
    },
    /// Loan application by id.
    Loan {
        /// Loan application id.
        id: u64,
    },
    /// Whether a principal is an authorized verifier.
    Verifier {
        /// Principal to check.
        principal: Principal,
    },
    /// The deployment owner.
    Owner,
    /// The id the next loan application will receive.
    NextLoanId,
}

impl QueryOp {
    /// The ledger query this operation runs.
    pub fn to_query(&self) -> Query {
        match self {
            Self::Identity { subject } => Query::GetIdentity {
                subject: subject.clone(),
            },
            Self::Loan { id } => Query::GetLoanApplication { id: LoanId(*id) },
            Self::Verifier { principal } => Query::IsAuthorizedVerifier {
                principal: principal.clone(),
            },
            Self::Owner => Query::GetOwner,
            Self::NextLoanId => Query::GetNextLoanId,
        }
    }
}

/// Execute the query subcommand.
pub fn run_query(args: &QueryArgs, config: &CliConfig) -> Result<u8> {
    println!("{}", query_json(args, config)?);
    Ok(0)
}

fn query_json(args: &QueryArgs, config: &CliConfig) -> Result<String> {
    let envelope = store::load(&config.state_file)?;
    let result = envelope.ledger.query(&args.op.to_query());
    Ok(serde_json::to_string_pretty(&result)?)
}
