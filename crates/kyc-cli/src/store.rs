//! # Ledger State File
//!
//! The CLI persists one [`Ledger`] per state file, wrapped in a versioned
//! envelope with wall-clock bookkeeping. Writes go to a uniquely named
//! sibling temp file that is then persisted over the target, so an
//! interrupted write never leaves a truncated state file behind and two
//! concurrent writers never share a temp file.
//!
//! ## Single Writer
//!
//! The state file is not locked. Each invocation loads, applies and saves,
//! so two processes writing the same file concurrently race and the last
//! save wins. Serialize invocations against one state file.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kyc_core::Principal;
use kyc_state::Ledger;

/// Current on-disk format version.
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Persisted form of a ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEnvelope {
    /// Format version; must equal [`STATE_FORMAT_VERSION`].
    pub version: u32,
    /// When the ledger was deployed.
    pub created_at: DateTime<Utc>,
    /// When the file was last written.
    pub updated_at: DateTime<Utc>,
    /// The ledger itself.
    pub ledger: Ledger,
}

impl StateEnvelope {
    /// Wrap a freshly deployed ledger.
    pub fn deploy(owner: Principal) -> Self {
        let now = Utc::now();
        Self {
            version: STATE_FORMAT_VERSION,
            created_at: now,
            updated_at: now,
            ledger: Ledger::deploy(owner),
        }
    }
}

/// Read and validate a state file.
pub fn load(path: &Path) -> Result<StateEnvelope> {
    if !path.exists() {
        bail!(
            "no ledger state at {} (run `kyc deploy --owner <principal>` first)",
            path.display()
        );
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file: {}", path.display()))?;
    let envelope: StateEnvelope = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse state file: {}", path.display()))?;
    if envelope.version != STATE_FORMAT_VERSION {
        bail!(
            "unsupported state file version {} in {} (expected {STATE_FORMAT_VERSION})",
            envelope.version,
            path.display()
        );
    }
    tracing::debug!(
        path = %path.display(),
        height = %envelope.ledger.block_height(),
        receipts = envelope.ledger.receipts().len(),
        "loaded ledger state"
    );
    Ok(envelope)
}

/// Stamp `updated_at` and write the envelope atomically.
pub fn save(path: &Path, envelope: &mut StateEnvelope) -> Result<()> {
    envelope.updated_at = Utc::now();

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create state directory: {}", dir.display()))?;

    let json = serde_json::to_string_pretty(envelope)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp state file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("failed to write temp state file: {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace state file: {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        height = %envelope.ledger.block_height(),
        "saved ledger state"
    );
    Ok(())
}
