//! # Loan Application Lifecycle
//!
//! ## States
//!
//! ```text
//! Pending ──approve──▶ Approved (terminal)
//!    │
//!    └─────reject───▶ Rejected (terminal)
//! ```
//!
//! Applying has no identity precondition: the pending state exists so the
//! verifier makes the KYC judgment at decision time. Deciding requires the
//! caller to pass the identity registry's verifier predicate, reached
//! through [`VerifierAuthority`].
//!
//! Loan ids come from a monotonic counter and are never reused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kyc_core::{CallContext, KycError, LoanId, Principal};

use crate::identity::VerifierAuthority;

// ─── Loan Status ─────────────────────────────────────────────────────

/// Lifecycle state of a loan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Awaiting a verifier decision.
    Pending,
    /// Approved by a verifier (terminal).
    Approved,
    /// Rejected by a verifier (terminal).
    Rejected,
}

impl LoanStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

// ─── Loan Application ────────────────────────────────────────────────

/// A loan application and its decision, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Sequential id.
    pub id: LoanId,
    /// Principal that applied.
    pub applicant: Principal,
    /// Requested amount, always positive.
    pub amount: u64,
    /// Current lifecycle state.
    pub status: LoanStatus,
    /// Verifier that decided the application. Set on approval and on
    /// rejection.
    pub approved_by: Option<Principal>,
}

// ─── Service ─────────────────────────────────────────────────────────

/// Loan applications keyed by id, plus the id counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanService {
    next_id: LoanId,
    applications: BTreeMap<LoanId, LoanApplication>,
}

impl LoanService {
    /// An empty service whose first application gets id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// File a new pending application for the caller.
    ///
    /// Fails with `InvalidAmount` unless `amount > 0`, then with
    /// `LoanIdsExhausted` once the counter cannot advance. A failed call does
    /// not consume an id.
    pub fn apply_for_loan(&mut self, ctx: &CallContext, amount: i64) -> Result<LoanId, KycError> {
        let amount = u64::try_from(amount)
            .ok()
            .filter(|a| *a > 0)
            .ok_or(KycError::InvalidAmount { amount })?;
        let id = self.next_id;
        let next = id
            .checked_next()
            .ok_or(KycError::LoanIdsExhausted { at: id })?;
        self.applications.insert(
            id,
            LoanApplication {
                id,
                applicant: ctx.caller.clone(),
                amount,
                status: LoanStatus::Pending,
                approved_by: None,
            },
        );
        self.next_id = next;
        Ok(id)
    }

    /// Approve a pending application (PENDING → APPROVED).
    pub fn approve_loan(
        &mut self,
        ctx: &CallContext,
        authority: &impl VerifierAuthority,
        id: LoanId,
    ) -> Result<(), KycError> {
        self.decide(ctx, authority, id, LoanStatus::Approved, "approve-loan")
    }

    /// Reject a pending application (PENDING → REJECTED).
    pub fn reject_loan(
        &mut self,
        ctx: &CallContext,
        authority: &impl VerifierAuthority,
        id: LoanId,
    ) -> Result<(), KycError> {
        self.decide(ctx, authority, id, LoanStatus::Rejected, "reject-loan")
    }

    /// Look up an application. Absence is a normal result.
    pub fn get_loan_application(&self, id: LoanId) -> Option<&LoanApplication> {
        self.applications.get(&id)
    }

    /// The id the next successful application will receive.
    pub fn next_loan_id(&self) -> LoanId {
        self.next_id
    }

    /// All applications in id order.
    pub fn applications(&self) -> impl Iterator<Item = &LoanApplication> {
        self.applications.values()
    }

    /// Checks, in order: the loan exists, the caller is a verifier, the loan
    /// is pending.
    fn decide(
        &mut self,
        ctx: &CallContext,
        authority: &impl VerifierAuthority,
        id: LoanId,
        target: LoanStatus,
        action: &'static str,
    ) -> Result<(), KycError> {
        let application = self
            .applications
            .get_mut(&id)
            .ok_or(KycError::LoanNotFound { id })?;
        if !authority.is_authorized_verifier(&ctx.caller) {
            return Err(KycError::Unauthorized {
                caller: ctx.caller.clone(),
                action,
            });
        }
        if application.status != LoanStatus::Pending {
            return Err(KycError::InvalidState {
                id,
                status: application.status.to_string(),
            });
        }
        application.status = target;
        application.approved_by = Some(ctx.caller.clone());
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
