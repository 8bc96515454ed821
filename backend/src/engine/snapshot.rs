//! Snapshot - Save/Restore Draw State
//!
//! Serializes a draw together with the options it was propagated under and
//! a SHA-256 digest of its canonical JSON form. The digest doubles as a
//! cheap equality check in tests: two draws with the same digest are the
//! same graph state.
//!
//! # Critical Invariants
//!
//! - **Canonical form**: object keys are sorted before hashing, so the
//!   digest does not depend on serializer field order
//! - **Integrity**: a snapshot only restores if its digest matches its draw

use crate::error::DrawError;
use crate::models::draw::DrawDefinition;
use crate::models::outcome::PropagationOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// ============================================================================
// Snapshot Structure
// ============================================================================

/// Complete engine state at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSnapshot {
    pub draw: DrawDefinition,

    #[serde(default)]
    pub options: PropagationOptions,

    /// Number of propagation calls made before the snapshot
    #[serde(default)]
    pub sequence: usize,

    /// SHA256 of the canonical draw JSON
    pub digest: String,
}

impl DrawSnapshot {
    pub fn capture(
        draw: &DrawDefinition,
        options: PropagationOptions,
        sequence: usize,
    ) -> Result<Self, DrawError> {
        Ok(Self {
            draw: draw.clone(),
            options,
            sequence,
            digest: state_digest(draw)?,
        })
    }

    /// Recompute the digest and compare
    pub fn verify(&self) -> Result<(), DrawError> {
        let actual = state_digest(&self.draw)?;
        if actual != self.digest {
            return Err(DrawError::invalid(format!(
                "snapshot digest mismatch: expected {}, got {}",
                self.digest, actual
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Digest
// ============================================================================

/// Deterministic SHA256 of a draw's canonical JSON
pub fn state_digest(draw: &DrawDefinition) -> Result<String, DrawError> {
    let value = serde_json::to_value(draw)
        .map_err(|e| DrawError::invalid(format!("draw serialization failed: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| DrawError::invalid(format!("draw serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
