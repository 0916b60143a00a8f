//! # Proof Hashing
//!
//! The ledger collaborator receives a digest of the proof rather than the
//! proof itself. The digest covers both the payload and the public
//! signals in a canonical serialization, so two proofs differing in
//! either produce different hashes.

use sha2::{Digest, Sha256};

use crate::proof::Proof;

/// SHA-256 hex digest over a proof's payload and public signals.
pub fn proof_hash(proof: &Proof) -> String {
    let mut hasher = Sha256::new();
    // Compact serialization of a parsed Value is canonical enough here:
    // both sides of any comparison go through the same path.
    if let Ok(payload) = serde_json::to_string(&proof.payload) {
        hasher.update(payload.as_bytes());
    }
    for signal in &proof.public_signals {
        hasher.update(signal.as_bytes());
        hasher.update(b"\x00");
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zkpipe_core::ProvingSystem;

    fn proof(signals: &[&str]) -> Proof {
        Proof {
            system: ProvingSystem::Groth16,
            payload: json!({"pi_a": ["1"]}),
            public_signals: signals.iter().map(|s| s.to_string()).collect(),
            duration_ms: 0,
        }
    }

    #[test]
    fn hash_is_stable() {
        assert_eq!(proof_hash(&proof(&["12"])), proof_hash(&proof(&["12"])));
    }

    #[test]
    fn hash_depends_on_signals() {
        assert_ne!(proof_hash(&proof(&["12"])), proof_hash(&proof(&["13"])));
        // Signal boundaries matter: ["1","2"] != ["12"].
        assert_ne!(proof_hash(&proof(&["1", "2"])), proof_hash(&proof(&["12"])));
    }

    #[test]
    fn hash_depends_on_payload() {
        let mut other = proof(&["12"]);
        other.payload = json!({"pi_a": ["2"]});
        assert_ne!(proof_hash(&other), proof_hash(&proof(&["12"])));
    }

    #[test]
    fn hash_is_hex_encoded_sha256() {
        let h = proof_hash(&proof(&["12"]));
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
