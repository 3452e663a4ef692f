//! # Error Types — Failure Taxonomy
//!
//! Defines the failure kinds every mutating entry point can return. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Every failure is a normal, inspectable outcome. Nothing panics across
//!   the call boundary and nothing is retried by the core.
//! - Each [`KycError`] variant carries the context needed for an audit line
//!   (caller, subject, loan id, offending value).
//! - [`ErrorKind`] is the closed, serializable classification that crosses
//!   the boundary. Its numeric [`ErrorKind::code`] is stable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{LoanId, Principal};

/// A rejected mutating call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KycError {
    /// The caller lacks the role the operation requires.
    #[error("unauthorized: {caller} may not {action}")]
    Unauthorized {
        /// The principal that attempted the call.
        caller: Principal,
        /// The guarded action (e.g. "approve-loan").
        action: &'static str,
    },

    /// A mutation referenced a subject with no identity record.
    #[error("no identity record for subject {subject}")]
    SubjectNotFound {
        /// The subject that was looked up.
        subject: Principal,
    },

    /// A mutation referenced a loan application that does not exist.
    #[error("no such loan application {id}")]
    LoanNotFound {
        /// The requested loan id.
        id: LoanId,
    },

    /// The caller already owns an identity record.
    #[error("identity already registered for {subject}")]
    AlreadyRegistered {
        /// The principal that tried to register twice.
        subject: Principal,
    },

    /// The loan application has left the pending state.
    #[error("{id} is {status}, expected PENDING")]
    InvalidState {
        /// The loan that was targeted.
        id: LoanId,
        /// The status the loan is currently in.
        status: String,
    },

    /// A credit score outside the accepted range.
    #[error("credit score {value} outside [{min}, {max}]")]
    InvalidRange {
        /// The rejected score.
        value: i64,
        /// Inclusive lower bound.
        min: u16,
        /// Inclusive upper bound.
        max: u16,
    },

    /// A loan amount that is not strictly positive.
    #[error("loan amount must be positive, got {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// The loan id counter is at the end of its range.
    #[error("loan id space exhausted at {at}")]
    LoanIdsExhausted {
        /// The counter value that cannot be issued.
        at: LoanId,
    },
}

impl KycError {
    /// The boundary classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::SubjectNotFound { .. } | Self::LoanNotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyRegistered { .. } => ErrorKind::AlreadyRegistered,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::InvalidRange { .. } => ErrorKind::InvalidRange,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::LoanIdsExhausted { .. } => ErrorKind::Exhausted,
        }
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> u16 {
        self.kind().code()
    }
}

/// Closed classification of failures as seen by external clients.
///
/// | Kind | Code |
/// |------|------|
/// | `InvalidAmount`, `InvalidRange` | 400 |
/// | `Unauthorized` | 401 |
/// | `InvalidState` | 401 |
/// | `AlreadyRegistered` | 403 |
/// | `NotFound` | 404 |
/// | `Exhausted` | 409 |
///
/// `InvalidState` shares the 401 access class with `Unauthorized`; clients
/// that need to tell them apart branch on the kind, not the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the required role.
    Unauthorized,
    /// Referenced record is absent.
    NotFound,
    /// Uniqueness violation on registration.
    AlreadyRegistered,
    /// Operation not valid for the record's lifecycle state.
    InvalidState,
    /// Argument outside its accepted range.
    InvalidRange,
    /// Loan amount is not positive.
    InvalidAmount,
    /// A sequential counter has no ids left.
    Exhausted,
}

impl ErrorKind {
    /// Stable numeric code surfaced at the boundary.
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidRange | Self::InvalidAmount => 400,
            Self::Unauthorized | Self::InvalidState => 401,
            Self::AlreadyRegistered => 403,
            Self::NotFound => 404,
            Self::Exhausted => 409,
        }
    }

    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::AlreadyRegistered => "already_registered",
            Self::InvalidState => "invalid_state",
            Self::InvalidRange => "invalid_range",
            Self::InvalidAmount => "invalid_amount",
            Self::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from constructing or encoding core values.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A principal string failed validation.
    #[error("invalid principal {value:?}: {reason}")]
    InvalidPrincipal {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A string did not name any variant of a closed enum.
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// The enum being parsed (e.g. "kyc status").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// JCS canonicalization failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    #[test]
    fn codes_match_client_contract() {
        assert_eq!(ErrorKind::Unauthorized.code(), 401);
        assert_eq!(ErrorKind::NotFound.code(), 404);
        assert_eq!(ErrorKind::AlreadyRegistered.code(), 403);
        assert_eq!(ErrorKind::InvalidState.code(), 401);
        assert_eq!(ErrorKind::InvalidRange.code(), 400);
        assert_eq!(ErrorKind::InvalidAmount.code(), 400);
        assert_eq!(ErrorKind::Exhausted.code(), 409);
    }

    #[test]
    fn both_not_found_variants_share_a_kind() {
        let subject = KycError::SubjectNotFound {
            subject: principal("ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC"),
        };
        let loan = KycError::LoanNotFound { id: LoanId(999) };
        assert_eq!(subject.kind(), ErrorKind::NotFound);
        assert_eq!(loan.kind(), ErrorKind::NotFound);
        assert_eq!(loan.code(), 404);
    }

    #[test]
    fn invalid_state_is_distinct_from_unauthorized() {
        let state = KycError::InvalidState {
            id: LoanId(0),
            status: "APPROVED".to_string(),
        };
        let auth = KycError::Unauthorized {
            caller: principal("ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC"),
            action: "approve-loan",
        };
        assert_eq!(state.code(), auth.code());
        assert_ne!(state.kind(), auth.kind());
    }

    #[test]
    fn display_carries_context() {
        let err = KycError::InvalidRange {
            value: 851,
            min: 0,
            max: 850,
        };
        assert_eq!(err.to_string(), "credit score 851 outside [0, 850]");

        let err = KycError::InvalidState {
            id: LoanId(3),
            status: "REJECTED".to_string(),
        };
        assert_eq!(err.to_string(), "loan:3 is REJECTED, expected PENDING");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::AlreadyRegistered).unwrap();
        assert_eq!(json, "\"already_registered\"");
        let parsed: ErrorKind = serde_json::from_str("\"invalid_state\"").unwrap();
        assert_eq!(parsed, ErrorKind::InvalidState);
    }
}
