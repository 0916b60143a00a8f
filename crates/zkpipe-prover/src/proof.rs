//! # Proof and Verification Result Types
//!
//! A proof couples the opaque payload with its ordered public signals,
//! the proving system that produced it, and the wall-clock generation
//! time. Nothing in the pipeline interprets the payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use zkpipe_core::ProvingSystem;

/// A generated proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proof {
    /// The proving system that produced this proof.
    pub system: ProvingSystem,
    /// Opaque proof payload, exactly as the tool wrote it.
    pub payload: Value,
    /// Ordered public signal values (decimal strings).
    pub public_signals: Vec<String>,
    /// Wall-clock generation time in milliseconds. Only meaningful for
    /// proofs that were generated successfully (a failed generation
    /// produces no `Proof` at all).
    pub duration_ms: u64,
}

/// Outcome of a verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether the proof verified against the key and public signals.
    pub verified: bool,
    /// Diagnostic text for rejected proofs. A rejection does not
    /// distinguish an invalid proof from malformed public signals.
    pub diagnostic: Option<String>,
    /// Wall-clock verification time in milliseconds.
    pub duration_ms: u64,
}

impl VerificationResult {
    /// A passing result.
    pub fn accepted(duration_ms: u64) -> Self {
        Self {
            verified: true,
            diagnostic: None,
            duration_ms,
        }
    }

    /// A clean rejection (not an error).
    pub fn rejected(duration_ms: u64) -> Self {
        Self {
            verified: false,
            diagnostic: Some(
                "proof did not verify against the supplied key and public signals".to_string(),
            ),
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn proof_serde_round_trip() {
        let proof = Proof {
            system: ProvingSystem::Groth16,
            payload: json!({"pi_a": ["1", "2", "1"]}),
            public_signals: vec!["12".to_string()],
            duration_ms: 42,
        };
        let json = serde_json::to_string(&proof).unwrap();
        let back: Proof = serde_json::from_str(&json).unwrap();
        assert_eq!(back.system, ProvingSystem::Groth16);
        assert_eq!(back.public_signals, vec!["12"]);
        assert_eq!(back.payload, proof.payload);
    }

    #[test]
    fn rejection_carries_diagnostic() {
        let result = VerificationResult::rejected(7);
        assert!(!result.verified);
        assert!(result.diagnostic.is_some());
        assert!(VerificationResult::accepted(3).diagnostic.is_none());
    }
}
