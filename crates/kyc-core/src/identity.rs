//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the registries.
//! A `LoanId` cannot stand in for a block height, and a raw string cannot
//! stand in for an authenticated principal.
//!
//! ## Security Invariant
//!
//! A [`Principal`] can only be built through [`Principal::new`] (or serde,
//! which routes through the same validation). Every principal in the state
//! is therefore non-empty, bounded and free of whitespace.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum accepted principal length (standard address plus contract name).
pub const MAX_PRINCIPAL_LEN: usize = 171;

/// An authenticated ledger principal (account or contract address).
///
/// The transport authenticates the caller and hands the core a `Principal`;
/// the core never inspects signatures. Accepted characters are ASCII
/// alphanumerics plus `.`, `-` and `_`, which covers both standard
/// principals (`ST2JHG...`) and contract principals (`ST1PQ....identity`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Validate and wrap a principal string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPrincipal`] if the input is empty, longer
    /// than [`MAX_PRINCIPAL_LEN`], or contains a disallowed character.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CoreError::InvalidPrincipal {
                value,
                reason: "must not be empty",
            });
        }
        if value.len() > MAX_PRINCIPAL_LEN {
            return Err(CoreError::InvalidPrincipal {
                value,
                reason: "too long",
            });
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(CoreError::InvalidPrincipal {
                value,
                reason: "contains characters outside [A-Za-z0-9._-]",
            });
        }
        Ok(Self(value))
    }

    /// Access the principal as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Principal {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl FromStr for Principal {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequential identifier of a loan application, starting at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl LoanId {
    /// The first id ever allocated.
    pub const FIRST: LoanId = LoanId(0);

    /// Access the raw counter value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id allocated after this one, or `None` at the end of the id space.
    pub fn checked_next(&self) -> Option<LoanId> {
        self.0.checked_add(1).map(LoanId)
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "loan:{}", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any string over the principal alphabet within the length bound is
        /// accepted and survives a serde round trip unchanged.
        #[test]
        fn alphabet_strings_are_principals(raw in "[A-Za-z0-9._-]{1,171}") {
            let principal = Principal::new(raw.clone()).unwrap();
            prop_assert_eq!(principal.as_str(), raw.as_str());
            let json = serde_json::to_string(&principal).unwrap();
            let back: Principal = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, principal);
        }

        /// A single disallowed character anywhere makes the whole string invalid.
        #[test]
        fn one_bad_char_rejects(
            prefix in "[A-Za-z0-9]{0,40}",
            bad in "[ /:@#\t]",
            suffix in "[A-Za-z0-9]{0,40}",
        ) {
            let raw = format!("{prefix}{bad}{suffix}");
            prop_assert!(Principal::new(raw.clone()).is_err());
            prop_assert!(serde_json::from_value::<Principal>(serde_json::Value::String(raw)).is_err());
        }

        #[test]
        fn checked_next_increments_below_max(n in 0u64..u64::MAX) {
            prop_assert_eq!(LoanId(n).checked_next(), Some(LoanId(n + 1)));
        }
    }
}
