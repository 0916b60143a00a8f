//! # Key Ceremony Service
//!
//! Derives per-circuit proving keys in two phases: a circuit-independent
//! universal setup file (phase 1, cached by [`SetupStore`]) and a
//! circuit-specific derivation (phase 2). Groth16 additionally applies
//! one contribution step; the intermediate key is deleted afterwards.
//! PLONK and FFLONK derivation emits the final key directly.
//!
//! Staleness-triggered regeneration is the only self-healing behavior in
//! the pipeline: when the constraint system is newer than the cached
//! key, the key and its exported verification key are removed and
//! rebuilt on the spot.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use zkpipe_backend::ProvingBackend;
use zkpipe_core::config::SetupConfig;
use zkpipe_core::{CircuitName, ProvingSystem, WorkspaceConfig};

use crate::error::KeyError;
use crate::setup::SetupStore;
use crate::staleness::{MtimeStaleness, StalenessPredicate};

/// Length of the contribution entropy string.
const ENTROPY_LEN: usize = 32;

/// Key ceremony manager for one workspace.
pub struct KeyCeremony {
    workspace: WorkspaceConfig,
    backend: Arc<dyn ProvingBackend>,
    setup: SetupStore,
    staleness: Box<dyn StalenessPredicate>,
}

impl KeyCeremony {
    /// Create a ceremony manager with the default mtime staleness check.
    pub fn new(
        workspace: WorkspaceConfig,
        backend: Arc<dyn ProvingBackend>,
        setup_config: &SetupConfig,
    ) -> Self {
        let setup = SetupStore::new(workspace.setup_dir(), setup_config);
        Self {
            workspace,
            backend,
            setup,
            staleness: Box::new(MtimeStaleness),
        }
    }

    /// Replace the staleness predicate (e.g. content-hash invalidation).
    pub fn with_staleness(mut self, predicate: Box<dyn StalenessPredicate>) -> Self {
        self.staleness = predicate;
        self
    }

    /// The setup store this ceremony draws from.
    pub fn setup_store(&self) -> &SetupStore {
        &self.setup
    }

    /// Path of the final proving key for a circuit.
    pub fn proving_key_path(&self, name: &CircuitName, system: ProvingSystem) -> PathBuf {
        self.workspace.proving_key_path(name, system)
    }

    /// Path of the exported verification key for a circuit.
    pub fn verification_key_path(&self, name: &CircuitName, system: ProvingSystem) -> PathBuf {
        self.workspace.verification_key_path(name, system)
    }

    /// Pseudo-random contribution entropy.
    ///
    /// This is a thread-local-generator alphanumeric string, not audited
    /// ceremony-grade randomness. Whether that satisfies a given trust
    /// model is a deployment question; ceremonies with external
    /// contributors replace this step entirely.
    fn contribution_entropy() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ENTROPY_LEN)
            .map(char::from)
            .collect()
    }

    /// Return a valid proving-key path for the circuit, deriving or
    /// regenerating as needed.
    ///
    /// `constraint_hint`, when known, is checked against the selected
    /// setup tier's capacity — an overflow logs a warning but does not
    /// fail; the selection policy remains first-found.
    pub async fn get_or_create_key(
        &self,
        name: &CircuitName,
        r1cs: &Path,
        system: ProvingSystem,
        constraint_hint: Option<u64>,
    ) -> Result<PathBuf, KeyError> {
        if !r1cs.exists() {
            return Err(KeyError::ArtifactMissing {
                path: r1cs.to_path_buf(),
            });
        }

        let final_key = self.proving_key_path(name, system);
        if final_key.exists() {
            if !self.staleness.is_stale(&final_key, r1cs)? {
                tracing::debug!(circuit = %name, system = %system, "proving key cache hit");
                return Ok(final_key);
            }
            tracing::info!(
                circuit = %name,
                system = %system,
                "constraint system newer than cached proving key, regenerating"
            );
            tokio::fs::remove_file(&final_key).await?;
            // The exported verification key derives from the stale key.
            match tokio::fs::remove_file(self.verification_key_path(name, system)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        let (tier, ptau) = self.setup.acquire().await?;
        if let Some(constraints) = constraint_hint {
            if constraints > tier.capacity() {
                tracing::warn!(
                    circuit = %name,
                    constraints,
                    tier = tier.file_name,
                    capacity = tier.capacity(),
                    "circuit may exceed selected setup capacity; derivation can fail downstream"
                );
            }
        }

        tokio::fs::create_dir_all(self.workspace.keys_dir()).await?;
        if system.requires_contribution() {
            let intermediate = self
                .workspace
                .keys_dir()
                .join(format!("{name}_{}_0000.zkey", system.as_str()));
            self.backend
                .setup_key(system, r1cs, &ptau, &intermediate)
                .await?;
            let entropy = Self::contribution_entropy();
            let contributed = self
                .backend
                .contribute(&intermediate, &final_key, &entropy)
                .await;
            // The intermediate key is scratch regardless of outcome.
            let _ = tokio::fs::remove_file(&intermediate).await;
            contributed?;
        } else {
            self.backend
                .setup_key(system, r1cs, &ptau, &final_key)
                .await?;
        }

        tracing::info!(
            circuit = %name,
            system = %system,
            tier = tier.file_name,
            key = %final_key.display(),
            "proving key derived"
        );
        Ok(final_key)
    }

    /// Export the verification key from the circuit's final proving key.
    pub async fn export_verification_key(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
    ) -> Result<PathBuf, KeyError> {
        let proving_key = self.proving_key_path(name, system);
        if !proving_key.exists() {
            return Err(KeyError::ArtifactMissing { path: proving_key });
        }
        let vkey = self.verification_key_path(name, system);
        self.backend
            .export_verification_key(&proving_key, &vkey)
            .await?;
        Ok(vkey)
    }

    /// Return the exported verification key, recomputing it from the
    /// proving key when absent.
    pub async fn verification_key(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
    ) -> Result<PathBuf, KeyError> {
        let vkey = self.verification_key_path(name, system);
        if vkey.exists() {
            return Ok(vkey);
        }
        self.export_verification_key(name, system).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_is_alphanumeric_and_sized() {
        let entropy = KeyCeremony::contribution_entropy();
        assert_eq!(entropy.len(), ENTROPY_LEN);
        assert!(entropy.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
