//! # kyc-core — Foundational Types for the KYC Lending Stack
//!
//! Every other crate in the workspace depends on `kyc-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Principal`, `LoanId`,
//!    `BlockHeight`. No bare strings or integers for identifiers.
//!
//! 2. **Explicit caller.** Every mutating entry point takes a
//!    [`CallContext`]. Nothing reads the caller from ambient state.
//!
//! 3. **One failure taxonomy.** [`KycError`] for the rich error,
//!    [`ErrorKind`] with a stable numeric code for the boundary.
//!
//! 4. **Canonical digests.** State fingerprints flow through
//!    [`CanonicalBytes`] and [`sha256_digest`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kyc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod context;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use context::CallContext;
pub use digest::{sha256_digest, StateDigest};
pub use error::{CoreError, ErrorKind, KycError};
pub use identity::{LoanId, Principal, MAX_PRINCIPAL_LEN};
pub use temporal::BlockHeight;
