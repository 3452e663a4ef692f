//! # Call Context
//!
//! The explicit, already-authenticated envelope every mutating entry point
//! receives. The core never reads the caller from ambient state.

use serde::{Deserialize, Serialize};

use crate::identity::Principal;
use crate::temporal::BlockHeight;

/// Who is calling, and at which block height the call executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// The authenticated caller principal.
    pub caller: Principal,
    /// Height at which the call executes; written into `last_updated` fields.
    pub block_height: BlockHeight,
}

impl CallContext {
    /// Build a context for `caller` executing at `block_height`.
    pub fn new(caller: Principal, block_height: BlockHeight) -> Self {
        Self {
            caller,
            block_height,
        }
    }
}
