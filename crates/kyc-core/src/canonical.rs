//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the only input accepted by
//! [`sha256_digest`](crate::digest::sha256_digest). Serialization goes
//! through `serde_jcs` (RFC 8785): sorted keys, compact separators,
//! deterministic bytes. Floats are rejected, since amounts and scores in the
//! registries are integers and a float in a state snapshot means something
//! upstream went wrong.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// The inner `Vec<u8>` is private; [`CanonicalBytes::new`] is the only
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Canonicalization`] if serialization fails or the
    /// value contains a non-integer number.
    pub fn new(obj: &impl Serialize) -> Result<Self, CoreError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let bytes = serde_jcs::to_string(&value)?.into_bytes();
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Number(n) if n.is_f64() => Err(CoreError::Canonicalization(
            serde::de::Error::custom(format!("float {n} not permitted in canonical state")),
        )),
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        _ => Ok(()),
    }
}
