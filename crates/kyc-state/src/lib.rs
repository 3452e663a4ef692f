//! # kyc-state — Registry State Machines
//!
//! The authoritative state of a deployment, expressed as plain owned
//! structures with explicit-context operations. No globals, no interior
//! mutability: every mutation takes `&mut self` and a [`kyc_core::CallContext`].
//!
//! ## Components
//!
//! - **Identity** (`identity.rs`): per-principal KYC status and credit
//!   score, guarded by an owner-managed verifier set.
//!
//! - **Loan** (`loan.rs`): loan applications with sequential ids and the
//!   `PENDING → APPROVED | REJECTED` lifecycle. Verifier rights are read
//!   through the [`VerifierAuthority`] trait, so the loan service never
//!   holds a copy of the verifier set.
//!
//! - **Ledger** (`ledger.rs`): owns both registries, advances the block
//!   height per call, applies each call atomically, and journals a
//!   [`Receipt`] for every call whether it succeeds or not.

pub mod identity;
pub mod ledger;
pub mod loan;

// ─── Identity re-exports ────────────────────────────────────────────

pub use identity::{
    CreditScore, IdentityRecord, IdentityRegistry, KycStatus, VerifierAuthority,
    MAX_CREDIT_SCORE, MIN_CREDIT_SCORE,
};

// ─── Loan re-exports ────────────────────────────────────────────────

pub use loan::{LoanApplication, LoanService, LoanStatus};

// ─── Ledger re-exports ──────────────────────────────────────────────

pub use ledger::{Call, CallValue, Ledger, Outcome, Query, QueryResult, Receipt, ScriptStep};
