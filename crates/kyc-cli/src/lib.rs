//! # kyc-cli — Operator CLI for the KYC Lending Stack
//!
//! Provides the `kyc` command-line interface. Each invocation loads the
//! ledger from a local JSON state file, applies at most one batch of calls
//! in order, and writes the file back.
//!
//! ## Subcommands
//!
//! - `kyc deploy` — Create a ledger state file for an owner.
//! - `kyc call` — Submit a mutating call as `--sender`.
//! - `kyc query` — Read-only lookups; absence prints `null`.
//! - `kyc replay` — Run a YAML/JSON transaction script.
//! - `kyc history` — List the receipt journal.
//! - `kyc digest` — Print the canonical state digest.
//!
//! ```bash
//! kyc deploy --owner ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG
//! kyc call --sender ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC apply-for-loan 10000
//! kyc query loan 0
//! ```
//!
//! ## Exit Codes
//!
//! `0` on success, `1` on an operational error (missing state file, bad
//! script, I/O), `2` when the ledger rejected a call.
//!
//! ## Concurrency
//!
//! The state file is written atomically but not locked. Run one writer per
//! state file at a time; concurrent `call` or `replay` invocations on the
//! same file race and the last save wins.

pub mod call;
pub mod config;
pub mod deploy;
pub mod inspect;
pub mod query;
pub mod replay;
pub mod store;
