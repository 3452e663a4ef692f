//! # Identity Registry
//!
//! Per-subject KYC records, the deployment owner, and the owner-managed set
//! of authorized verifiers.
//!
//! ## Access Rules
//!
//! ```text
//! register_identity            any caller, once per principal
//! add/remove verifier          owner only
//! update_kyc_status            verifier only, subject must be registered
//! update_credit_score          verifier only, score in [0, 850], subject registered
//! get_identity                 any caller, absence is None
//! ```
//!
//! Checks run in the order listed on each method and the first failure
//! wins. A failed call never mutates the registry.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use kyc_core::{BlockHeight, CallContext, CoreError, KycError, Principal};

/// Lowest accepted credit score.
pub const MIN_CREDIT_SCORE: u16 = 0;

/// Highest accepted credit score.
pub const MAX_CREDIT_SCORE: u16 = 850;

// ─── KYC Status ──────────────────────────────────────────────────────

/// Verification state of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    /// Registered, not yet reviewed.
    Unverified,
    /// Review in progress.
    Pending,
    /// Identity verified.
    Verified,
    /// Verification refused.
    Rejected,
}

impl KycStatus {
    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for KycStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(Self::Unverified),
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::UnknownVariant {
                kind: "kyc status",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Credit Score ────────────────────────────────────────────────────

/// A credit score known to lie in `[MIN_CREDIT_SCORE, MAX_CREDIT_SCORE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct CreditScore(u16);

impl CreditScore {
    /// Validate a raw score.
    ///
    /// # Errors
    ///
    /// Returns [`KycError::InvalidRange`] for values below 0 or above 850.
    pub fn new(value: i64) -> Result<Self, KycError> {
        if value < i64::from(MIN_CREDIT_SCORE) || value > i64::from(MAX_CREDIT_SCORE) {
            return Err(KycError::InvalidRange {
                value,
                min: MIN_CREDIT_SCORE,
                max: MAX_CREDIT_SCORE,
            });
        }
        // Bounds checked above; the cast is lossless.
        Ok(Self(value as u16))
    }

    /// Access the score.
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for CreditScore {
    type Error = KycError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CreditScore> for u16 {
    fn from(score: CreditScore) -> Self {
        score.0
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// The registry's view of one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Current verification state.
    pub kyc_status: KycStatus,
    /// Credit score, unset until a verifier writes one.
    pub credit_score: Option<CreditScore>,
    /// Block height of the last successful write to this record.
    pub last_updated: BlockHeight,
}

// ─── Authorization Seam ──────────────────────────────────────────────

/// Read-only authorization predicate consulted by other services.
///
/// [`IdentityRegistry`] is the only implementation in the stack; the loan
/// service receives it through this trait so it can never grow a second
/// copy of the verifier check.
pub trait VerifierAuthority {
    /// Whether `principal` may act as a verifier.
    fn is_authorized_verifier(&self, principal: &Principal) -> bool;
}

// ─── Registry ────────────────────────────────────────────────────────

/// Owner, verifier set and subject records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRegistry {
    owner: Principal,
    verifiers: BTreeSet<Principal>,
    records: BTreeMap<Principal, IdentityRecord>,
}

impl IdentityRegistry {
    /// Deploy an empty registry administered by `owner`.
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            verifiers: BTreeSet::new(),
            records: BTreeMap::new(),
        }
    }

    /// Create the caller's record as `unverified` with no credit score.
    ///
    /// Fails with `AlreadyRegistered` if the caller has a record.
    pub fn register_identity(&mut self, ctx: &CallContext) -> Result<(), KycError> {
        if self.records.contains_key(&ctx.caller) {
            return Err(KycError::AlreadyRegistered {
                subject: ctx.caller.clone(),
            });
        }
        self.records.insert(
            ctx.caller.clone(),
            IdentityRecord {
                kyc_status: KycStatus::Unverified,
                credit_score: None,
                last_updated: ctx.block_height,
            },
        );
        Ok(())
    }

    /// Grant verifier rights. Owner only; adding an existing verifier is a no-op.
    pub fn add_authorized_verifier(
        &mut self,
        ctx: &CallContext,
        verifier: Principal,
    ) -> Result<(), KycError> {
        self.require_owner(ctx, "add-authorized-verifier")?;
        self.verifiers.insert(verifier);
        Ok(())
    }

    /// Revoke verifier rights. Owner only; removing a non-verifier is a no-op.
    pub fn remove_authorized_verifier(
        &mut self,
        ctx: &CallContext,
        verifier: &Principal,
    ) -> Result<(), KycError> {
        self.require_owner(ctx, "remove-authorized-verifier")?;
        self.verifiers.remove(verifier);
        Ok(())
    }

    /// Set a subject's KYC status.
    ///
    /// Fails with `Unauthorized` unless the caller is a verifier, then with
    /// `NotFound` if the subject has no record.
    pub fn update_kyc_status(
        &mut self,
        ctx: &CallContext,
        subject: &Principal,
        status: KycStatus,
    ) -> Result<(), KycError> {
        self.require_verifier(ctx, "update-kyc-status")?;
        let record = self.record_mut(subject)?;
        record.kyc_status = status;
        record.last_updated = ctx.block_height;
        Ok(())
    }

    /// Set a subject's credit score.
    ///
    /// Fails with `Unauthorized` unless the caller is a verifier, then with
    /// `InvalidRange` for scores outside `[0, 850]`, then with `NotFound`.
    pub fn update_credit_score(
        &mut self,
        ctx: &CallContext,
        subject: &Principal,
        score: i64,
    ) -> Result<(), KycError> {
        self.require_verifier(ctx, "update-credit-score")?;
        let score = CreditScore::new(score)?;
        let record = self.record_mut(subject)?;
        record.credit_score = Some(score);
        record.last_updated = ctx.block_height;
        Ok(())
    }

    /// Look up a subject. Absence is a normal result.
    pub fn get_identity(&self, subject: &Principal) -> Option<&IdentityRecord> {
        self.records.get(subject)
    }

    /// Whether `principal` is currently in the verifier set.
    pub fn is_authorized_verifier(&self, principal: &Principal) -> bool {
        self.verifiers.contains(principal)
    }

    /// The deployment owner.
    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Current verifiers in principal order.
    pub fn verifiers(&self) -> impl Iterator<Item = &Principal> {
        self.verifiers.iter()
    }

    /// Number of registered subjects.
    pub fn subject_count(&self) -> usize {
        self.records.len()
    }

    fn require_owner(&self, ctx: &CallContext, action: &'static str) -> Result<(), KycError> {
        if ctx.caller != self.owner {
            return Err(KycError::Unauthorized {
                caller: ctx.caller.clone(),
                action,
            });
        }
        Ok(())
    }

    fn require_verifier(&self, ctx: &CallContext, action: &'static str) -> Result<(), KycError> {
        if !self.is_authorized_verifier(&ctx.caller) {
            return Err(KycError::Unauthorized {
                caller: ctx.caller.clone(),
                action,
            });
        }
        Ok(())
    }

    fn record_mut(&mut self, subject: &Principal) -> Result<&mut IdentityRecord, KycError> {
        self.records
            .get_mut(subject)
            .ok_or_else(|| KycError::SubjectNotFound {
                subject: subject.clone(),
            })
    }
}

impl VerifierAuthority for IdentityRegistry {
    fn is_authorized_verifier(&self, principal: &Principal) -> bool {
        IdentityRegistry::is_authorized_verifier(self, principal)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use kyc_core::ErrorKind;
    use proptest::prelude::*;

    fn principal() -> impl Strategy<Value = Principal> {
        "ST[0-9A-Z]{20,39}".prop_map(|s| Principal::new(s).unwrap())
    }

    proptest! {
        /// Registering twice always fails the second time.
        #[test]
        fn register_is_once_per_principal(subject in principal(), h in 1u64..1_000_000) {
            let owner = Principal::new("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG").unwrap();
            let mut reg = IdentityRegistry::new(owner);
            let ctx = CallContext::new(subject.clone(), BlockHeight(h));
            prop_assert!(reg.register_identity(&ctx).is_ok());
            let err = reg.register_identity(&ctx).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::AlreadyRegistered);
        }

        /// Scores outside [0, 850] are rejected for any verifier.
        #[test]
        fn out_of_range_scores_rejected(
            score in prop_oneof![i64::MIN..0i64, 851i64..=i64::MAX],
            verifier in principal(),
        ) {
            let owner = Principal::new("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG").unwrap();
            let mut reg = IdentityRegistry::new(owner.clone());
            reg.add_authorized_verifier(&CallContext::new(owner, BlockHeight(1)), verifier.clone()).unwrap();
            let ctx = CallContext::new(verifier.clone(), BlockHeight(2));
            reg.register_identity(&ctx).unwrap();
            let err = reg.update_credit_score(&ctx, &verifier, score).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::InvalidRange);
        }

        /// In-range scores are stored verbatim.
        #[test]
        fn in_range_scores_stored(score in 0i64..=850) {
            prop_assert_eq!(i64::from(CreditScore::new(score).unwrap().value()), score);
        }
    }
}
