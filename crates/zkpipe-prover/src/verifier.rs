//! # Proof Verifier Service
//!
//! Cryptographic verification delegates to the backend; the only logic
//! here is staging the proof and public signals for the tool, locating
//! stored verification keys, and the non-cryptographic structural check
//! that screens out malformed submissions first.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use zkpipe_backend::ProvingBackend;
use zkpipe_core::{CircuitName, ProvingSystem, WorkspaceConfig};

use crate::error::VerifyError;
use crate::proof::{Proof, VerificationResult};

/// Required top-level fields per proving system, checked by
/// [`ProofVerifier::validate_structure`].
fn required_fields(system: ProvingSystem) -> &'static [&'static str] {
    match system {
        ProvingSystem::Groth16 => &["pi_a", "pi_b", "pi_c"],
        ProvingSystem::Plonk => &["A", "B", "C", "Z", "T1", "T2", "T3", "Wxi", "Wxiw"],
        ProvingSystem::Fflonk => &["polynomials", "evaluations"],
    }
}

/// Proof verification for one workspace.
pub struct ProofVerifier {
    workspace: WorkspaceConfig,
    backend: Arc<dyn ProvingBackend>,
}

impl ProofVerifier {
    /// Create a verifier over the given workspace and backend.
    pub fn new(workspace: WorkspaceConfig, backend: Arc<dyn ProvingBackend>) -> Self {
        Self { workspace, backend }
    }

    /// Cheap, non-cryptographic shape check on a proof payload.
    ///
    /// Rejects payloads that are not objects, lack a required field for
    /// the declared system, or carry a contradicting protocol tag. Makes
    /// no backend call.
    pub fn validate_structure(payload: &Value, system: ProvingSystem) -> Result<(), VerifyError> {
        let structure = |missing: Vec<String>| VerifyError::Structure {
            system: system.as_str().to_string(),
            missing,
        };

        let Some(object) = payload.as_object() else {
            return Err(structure(vec!["<object payload>".to_string()]));
        };
        let missing: Vec<String> = required_fields(system)
            .iter()
            .filter(|field| !object.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(structure(missing));
        }
        if let Some(tag) = object.get("protocol").and_then(Value::as_str) {
            if tag != system.as_str() {
                return Err(structure(vec![format!(
                    "protocol tag {tag:?} (expected {:?})",
                    system.as_str()
                )]));
            }
        }
        Ok(())
    }

    /// Verify a proof against a verification key on disk.
    ///
    /// Returns a clean boolean result; a `false` does not distinguish an
    /// invalid proof from malformed public signals.
    pub async fn verify(
        &self,
        vkey: &Path,
        proof: &Proof,
    ) -> Result<VerificationResult, VerifyError> {
        if !vkey.exists() {
            return Err(VerifyError::ArtifactMissing {
                path: vkey.to_path_buf(),
            });
        }

        // Stage the submission for the tool under a request-unique prefix.
        let tmp = self.workspace.tmp_dir();
        tokio::fs::create_dir_all(&tmp).await?;
        let request = Uuid::new_v4();
        let proof_path = tmp.join(format!("{request}.proof.json"));
        let public_path = tmp.join(format!("{request}.public.json"));
        tokio::fs::write(&proof_path, serde_json::to_vec(&proof.payload)?).await?;
        tokio::fs::write(&public_path, serde_json::to_vec(&proof.public_signals)?).await?;

        let started = Instant::now();
        let outcome = self
            .backend
            .verify(proof.system, vkey, &public_path, &proof_path)
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        // Staging files are request-scoped scratch.
        let _ = tokio::fs::remove_file(&proof_path).await;
        let _ = tokio::fs::remove_file(&public_path).await;

        let verified = outcome?;
        tracing::info!(system = %proof.system, verified, duration_ms, "verification finished");
        Ok(if verified {
            VerificationResult::accepted(duration_ms)
        } else {
            VerificationResult::rejected(duration_ms)
        })
    }

    /// Verify against the stored verification key for a circuit.
    ///
    /// Requires a previously exported key on disk; none is recomputed
    /// here.
    pub async fn verify_with_stored_key(
        &self,
        name: &CircuitName,
        proof: &Proof,
    ) -> Result<VerificationResult, VerifyError> {
        let vkey = self.stored_key_path(name, proof.system);
        if !vkey.exists() {
            return Err(VerifyError::ArtifactMissing { path: vkey });
        }
        self.verify(&vkey, proof).await
    }

    /// Where the stored verification key for a circuit lives.
    pub fn stored_key_path(&self, name: &CircuitName, system: ProvingSystem) -> PathBuf {
        self.workspace.verification_key_path(name, system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zkpipe_backend::MockBackend;

    fn groth16_payload() -> Value {
        json!({
            "pi_a": ["1", "2", "1"],
            "pi_b": [["1", "2"], ["3", "4"], ["1", "0"]],
            "pi_c": ["5", "6", "1"],
            "protocol": "groth16",
        })
    }

    #[test]
    fn complete_groth16_payload_passes() {
        assert!(
            ProofVerifier::validate_structure(&groth16_payload(), ProvingSystem::Groth16).is_ok()
        );
    }

    #[test]
    fn missing_field_fails_structure_check() {
        let mut payload = groth16_payload();
        payload.as_object_mut().unwrap().remove("pi_b");
        let err =
            ProofVerifier::validate_structure(&payload, ProvingSystem::Groth16).unwrap_err();
        match err {
            VerifyError::Structure { missing, .. } => assert_eq!(missing, vec!["pi_b"]),
            other => panic!("expected structure error, got {other:?}"),
        }
    }

    #[test]
    fn protocol_tag_mismatch_fails() {
        let mut payload = groth16_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("protocol".into(), json!("plonk"));
        assert!(ProofVerifier::validate_structure(&payload, ProvingSystem::Groth16).is_err());
    }

    #[test]
    fn plonk_requires_commitment_fields() {
        let payload = json!({"A": [], "B": [], "C": []});
        let err = ProofVerifier::validate_structure(&payload, ProvingSystem::Plonk).unwrap_err();
        match err {
            VerifyError::Structure { missing, .. } => {
                assert!(missing.contains(&"Z".to_string()));
                assert!(missing.contains(&"Wxiw".to_string()));
            }
            other => panic!("expected structure error, got {other:?}"),
        }
    }

    #[test]
    fn non_object_payload_fails() {
        assert!(
            ProofVerifier::validate_structure(&json!(["not", "an", "object"]), ProvingSystem::Fflonk)
                .is_err()
        );
    }

    #[tokio::test]
    async fn structure_check_makes_no_backend_call() {
        let backend = Arc::new(MockBackend::new());
        let _verifier = ProofVerifier::new(WorkspaceConfig::new("/ws"), backend.clone());
        let mut payload = groth16_payload();
        payload.as_object_mut().unwrap().remove("pi_c");
        let _ = ProofVerifier::validate_structure(&payload, ProvingSystem::Groth16);
        assert_eq!(backend.counts().verify(), 0);
    }

    #[tokio::test]
    async fn missing_stored_key_is_artifact_missing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let verifier = ProofVerifier::new(
            WorkspaceConfig::new(tmp.path()),
            Arc::new(MockBackend::new()),
        );
        let name = CircuitName::new("m").unwrap();
        let proof = Proof {
            system: ProvingSystem::Groth16,
            payload: groth16_payload(),
            public_signals: vec!["12".to_string()],
            duration_ms: 0,
        };
        let err = verifier
            .verify_with_stored_key(&name, &proof)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::ArtifactMissing { .. }), "{err}");
    }
}
