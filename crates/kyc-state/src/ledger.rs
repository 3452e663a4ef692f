//! # Ledger — Sequenced Execution of Registry Calls
//!
//! The `Ledger` is the single owned store for the deployment: the identity
//! registry, the loan service, the block height and the receipt journal.
//! It is initialized once by [`Ledger::deploy`] and mutated only through
//! [`Ledger::submit`].
//!
//! ## Execution Model
//!
//! Each submitted call:
//!
//! 1. advances the block height by one,
//! 2. runs against a consistent pre-state with an explicit [`CallContext`],
//! 3. either commits in full or leaves the registries untouched,
//! 4. is journaled as a [`Receipt`], success or failure.
//!
//! Queries go through [`Ledger::query`], never mutate, and report absence
//! as `None` rather than an error.

use serde::{Deserialize, Serialize};

use kyc_core::{
    sha256_digest, BlockHeight, CallContext, CanonicalBytes, CoreError, ErrorKind, KycError,
    LoanId, Principal, StateDigest,
};

use crate::identity::{IdentityRecord, IdentityRegistry, KycStatus};
use crate::loan::{LoanApplication, LoanService};

// ─── Calls ───────────────────────────────────────────────────────────

/// A mutating entry point with its arguments.
///
/// Serialized with an `op` tag carrying the public call name, e.g.
/// `{"op": "approve-loan", "id": 0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Call {
    /// Create the caller's identity record.
    RegisterIdentity,
    /// Owner grants verifier rights.
    AddAuthorizedVerifier {
        /// Principal to authorize.
        verifier: Principal,
    },
    /// Owner revokes verifier rights.
    RemoveAuthorizedVerifier {
        /// Principal to deauthorize.
        verifier: Principal,
    },
    /// Verifier sets a subject's KYC status.
    UpdateKycStatus {
        /// Subject whose record is updated.
        subject: Principal,
        /// New status.
        status: KycStatus,
    },
    /// Verifier sets a subject's credit score.
    UpdateCreditScore {
        /// Subject whose record is updated.
        subject: Principal,
        /// Raw score; validated against `[0, 850]`.
        score: i64,
    },
    /// Caller files a loan application.
    ApplyForLoan {
        /// Requested amount; must be positive. Signed so that a
        /// non-positive request still reaches the service and is journaled.
        amount: i64,
    },
    /// Verifier approves a pending application.
    ApproveLoan {
        /// Application id.
        id: LoanId,
    },
    /// Verifier rejects a pending application.
    RejectLoan {
        /// Application id.
        id: LoanId,
    },
}

impl Call {
    /// The public entry point name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterIdentity => "register-identity",
            Self::AddAuthorizedVerifier { .. } => "add-authorized-verifier",
            Self::RemoveAuthorizedVerifier { .. } => "remove-authorized-verifier",
            Self::UpdateKycStatus { .. } => "update-kyc-status",
            Self::UpdateCreditScore { .. } => "update-credit-score",
            Self::ApplyForLoan { .. } => "apply-for-loan",
            Self::ApproveLoan { .. } => "approve-loan",
            Self::RejectLoan { .. } => "reject-loan",
        }
    }
}

/// One call of a transaction script: the sender next to the flattened
/// call fields, e.g. `{"sender": "ST2...", "op": "apply-for-loan", "amount": 10}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Principal submitting the call.
    pub sender: Principal,
    /// The call, flattened beside `sender`.
    #[serde(flatten)]
    pub call: Call,
}

/// Success payload of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallValue {
    /// No payload.
    Unit,
    /// Id allocated by `apply-for-loan`.
    LoanId(LoanId),
}

// ─── Receipts ────────────────────────────────────────────────────────

/// Result of a call as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The call committed.
    Ok {
        /// Success payload.
        value: CallValue,
    },
    /// The call was rejected; no state changed.
    Err {
        /// Failure classification.
        kind: ErrorKind,
        /// Stable numeric code of `kind`.
        code: u16,
        /// Human-readable detail.
        message: String,
    },
}

impl Outcome {
    /// Whether the call committed.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// The failure kind, if the call was rejected.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Ok { .. } => None,
            Self::Err { kind, .. } => Some(*kind),
        }
    }
}

impl From<Result<CallValue, KycError>> for Outcome {
    fn from(result: Result<CallValue, KycError>) -> Self {
        match result {
            Ok(value) => Self::Ok { value },
            Err(e) => Self::Err {
                kind: e.kind(),
                code: e.code(),
                message: e.to_string(),
            },
        }
    }
}

/// Journal entry for one submitted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Position in the journal, starting at 0.
    pub index: u64,
    /// Height at which the call executed.
    pub block_height: BlockHeight,
    /// Authenticated caller.
    pub caller: Principal,
    /// The call as submitted.
    pub call: Call,
    /// What happened.
    pub outcome: Outcome,
}

// ─── Queries ─────────────────────────────────────────────────────────

/// A read-only entry point with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Query {
    /// Identity record of a subject.
    GetIdentity {
        /// Subject to look up.
        subject: Principal,
    },
    /// Loan application by id.
    GetLoanApplication {
        /// Application id.
        id: LoanId,
    },
    /// Whether a principal is in the verifier set.
    IsAuthorizedVerifier {
        /// Principal to check.
        principal: Principal,
    },
    /// The deployment owner.
    GetOwner,
    /// The id the next application will receive.
    GetNextLoanId,
}

/// Answer to a [`Query`]. Serializes as the bare value, `null` for absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// Answer to `get-identity`.
    Identity(Option<IdentityRecord>),
    /// Answer to `get-loan-application`.
    LoanApplication(Option<LoanApplication>),
    /// Answer to `is-authorized-verifier`.
    Authorized(bool),
    /// Answer to `get-owner`.
    Owner(Principal),
    /// Answer to `get-next-loan-id`.
    NextLoanId(LoanId),
}

// ─── Ledger ──────────────────────────────────────────────────────────

/// Registries plus sequencing state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    identity: IdentityRegistry,
    loans: LoanService,
    block_height: BlockHeight,
    receipts: Vec<Receipt>,
}

/// The part of the ledger covered by [`Ledger::state_digest`].
#[derive(Serialize)]
struct StateSnapshot<'a> {
    identity: &'a IdentityRegistry,
    loans: &'a LoanService,
}

impl Ledger {
    /// Deploy an empty ledger administered by `owner`.
    pub fn deploy(owner: Principal) -> Self {
        tracing::info!(owner = %owner, "deploying ledger");
        Self {
            identity: IdentityRegistry::new(owner),
            loans: LoanService::new(),
            block_height: BlockHeight::GENESIS,
            receipts: Vec::new(),
        }
    }

    /// Execute one call from `caller` at the next block height.
    ///
    /// Always returns a receipt; a rejected call is a normal outcome.
    pub fn submit(&mut self, caller: Principal, call: Call) -> Receipt {
        self.block_height = self.block_height.next();
        let ctx = CallContext::new(caller, self.block_height);
        let result = self.execute(&ctx, &call);

        match &result {
            Ok(value) => tracing::debug!(
                height = %ctx.block_height,
                caller = %ctx.caller,
                call = call.name(),
                ?value,
                "call committed"
            ),
            Err(e) => tracing::warn!(
                height = %ctx.block_height,
                caller = %ctx.caller,
                call = call.name(),
                kind = %e.kind(),
                error = %e,
                "call rejected"
            ),
        }

        let receipt = Receipt {
            index: self.receipts.len() as u64,
            block_height: ctx.block_height,
            caller: ctx.caller,
            call,
            outcome: result.into(),
        };
        self.receipts.push(receipt.clone());
        receipt
    }

    fn execute(&mut self, ctx: &CallContext, call: &Call) -> Result<CallValue, KycError> {
        match call {
            Call::RegisterIdentity => self.identity.register_identity(ctx).map(|()| CallValue::Unit),
            Call::AddAuthorizedVerifier { verifier } => self
                .identity
                .add_authorized_verifier(ctx, verifier.clone())
                .map(|()| CallValue::Unit),
            Call::RemoveAuthorizedVerifier { verifier } => self
                .identity
                .remove_authorized_verifier(ctx, verifier)
                .map(|()| CallValue::Unit),
            Call::UpdateKycStatus { subject, status } => self
                .identity
                .update_kyc_status(ctx, subject, *status)
                .map(|()| CallValue::Unit),
            Call::UpdateCreditScore { subject, score } => self
                .identity
                .update_credit_score(ctx, subject, *score)
                .map(|()| CallValue::Unit),
            Call::ApplyForLoan { amount } => {
                self.loans.apply_for_loan(ctx, *amount).map(CallValue::LoanId)
            }
            Call::ApproveLoan { id } => self
                .loans
                .approve_loan(ctx, &self.identity, *id)
                .map(|()| CallValue::Unit),
            Call::RejectLoan { id } => self
                .loans
                .reject_loan(ctx, &self.identity, *id)
                .map(|()| CallValue::Unit),
        }
    }

    /// Answer a read-only query.
    pub fn query(&self, query: &Query) -> QueryResult {
        match query {
            Query::GetIdentity { subject } => {
                QueryResult::Identity(self.identity.get_identity(subject).cloned())
            }
            Query::GetLoanApplication { id } => {
                QueryResult::LoanApplication(self.loans.get_loan_application(*id).cloned())
            }
            Query::IsAuthorizedVerifier { principal } => {
                QueryResult::Authorized(self.identity.is_authorized_verifier(principal))
            }
            Query::GetOwner => QueryResult::Owner(self.identity.owner().clone()),
            Query::GetNextLoanId => QueryResult::NextLoanId(self.loans.next_loan_id()),
        }
    }

    /// The identity registry.
    pub fn identity(&self) -> &IdentityRegistry {
        &self.identity
    }

    /// The loan service.
    pub fn loans(&self) -> &LoanService {
        &self.loans
    }

    /// Height of the most recently executed call.
    pub fn block_height(&self) -> BlockHeight {
        self.block_height
    }

    /// Every receipt, oldest first.
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// Digest of the registries. Receipts and block height are excluded, so
    /// a rejected call leaves the digest unchanged.
    pub fn state_digest(&self) -> Result<StateDigest, CoreError> {
        let snapshot = StateSnapshot {
            identity: &self.identity,
            loans: &self.loans,
        };
        let canonical = CanonicalBytes::new(&snapshot)?;
        Ok(sha256_digest(&canonical))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
