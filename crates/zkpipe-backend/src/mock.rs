//! # Mock Proving Backend
//!
//! A deterministic, transparent stand-in for the external proving tool.
//! Artifacts are SHA-256 digests of their inputs: proofs bind to the
//! proving key content and the public signals, verification keys bind to
//! the proving key, and verification recomputes the binding. The full
//! pipeline therefore round-trips hermetically — and a mutated public
//! signal or a foreign verification key fails verification — without any
//! external tool installed.
//!
//! ## Security Notice
//!
//! **NOT PRIVATE.** Anyone can recompute these "proofs" from the inputs.
//! The mock exists for tests and local development only.

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;

use zkpipe_core::ProvingSystem;

use crate::error::BackendError;
use crate::traits::ProvingBackend;

fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Flatten a JSON input assignment into ordered decimal-string signals.
///
/// Objects iterate in key order, arrays in element order; nested shapes
/// recurse. Order is deterministic for a given assignment.
fn flatten_signals(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (_, v) in map {
                flatten_signals(v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                flatten_signals(v, out);
            }
        }
        Value::Number(n) => out.push(n.to_string()),
        Value::String(s) => out.push(s.clone()),
        Value::Bool(b) => out.push(if *b { "1" } else { "0" }.to_string()),
        Value::Null => out.push("0".to_string()),
    }
}

/// Per-operation invocation counters, for short-circuit assertions.
#[derive(Debug, Default)]
pub struct CallCounts {
    witness: AtomicUsize,
    setup: AtomicUsize,
    contribute: AtomicUsize,
    export_vkey: AtomicUsize,
    prove: AtomicUsize,
    full_prove: AtomicUsize,
    verify: AtomicUsize,
    contract: AtomicUsize,
}

impl CallCounts {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of cryptographic verify calls made.
    pub fn verify(&self) -> usize {
        self.verify.load(Ordering::SeqCst)
    }

    /// Number of witness computations made.
    pub fn witness(&self) -> usize {
        self.witness.load(Ordering::SeqCst)
    }

    /// Number of key setup calls made.
    pub fn setup(&self) -> usize {
        self.setup.load(Ordering::SeqCst)
    }

    /// Number of contribution steps applied.
    pub fn contribute(&self) -> usize {
        self.contribute.load(Ordering::SeqCst)
    }

    /// Number of proof generations (either mode).
    pub fn proofs(&self) -> usize {
        self.prove.load(Ordering::SeqCst) + self.full_prove.load(Ordering::SeqCst)
    }

    /// Number of verification-key exports.
    pub fn vkey_exports(&self) -> usize {
        self.export_vkey.load(Ordering::SeqCst)
    }

    /// Number of verifier-contract exports.
    pub fn contracts(&self) -> usize {
        self.contract.load(Ordering::SeqCst)
    }
}

/// Deterministic mock backend. See the module docs for the binding scheme.
#[derive(Debug, Default)]
pub struct MockBackend {
    counts: CallCounts,
    fail_operation: Option<&'static str>,
}

impl MockBackend {
    /// Create a mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails the named operation (`"setup"`,
    /// `"prove"`, `"full_prove"`, ...) with an injected tool error.
    pub fn failing(operation: &'static str) -> Self {
        Self {
            counts: CallCounts::default(),
            fail_operation: Some(operation),
        }
    }

    /// Invocation counters.
    pub fn counts(&self) -> &CallCounts {
        &self.counts
    }

    fn injected_failure(&self, operation: &str) -> Result<(), BackendError> {
        if self.fail_operation == Some(operation) {
            return Err(BackendError::Tool {
                operation: operation.to_string(),
                status: Some(1),
                lines: vec![format!("error: injected {operation} failure")],
            });
        }
        Ok(())
    }

    fn proof_payload(system: ProvingSystem, binding: &str) -> Value {
        // Deterministic pseudo-coordinates carved from the binding digest.
        let a = &binding[..16];
        let b = &binding[16..32];
        let c = &binding[32..48];
        match system {
            ProvingSystem::Groth16 => json!({
                "pi_a": [a, b, "1"],
                "pi_b": [[a, b], [b, c], ["1", "0"]],
                "pi_c": [c, a, "1"],
                "protocol": "groth16",
                "curve": "bn128",
                "binding": binding,
            }),
            ProvingSystem::Plonk => json!({
                "A": [a, b, "1"],
                "B": [b, c, "1"],
                "C": [c, a, "1"],
                "Z": [a, c, "1"],
                "T1": [b, a, "1"],
                "T2": [c, b, "1"],
                "T3": [a, b, "1"],
                "Wxi": [b, c, "1"],
                "Wxiw": [c, a, "1"],
                "protocol": "plonk",
                "curve": "bn128",
                "binding": binding,
            }),
            ProvingSystem::Fflonk => json!({
                "polynomials": { "C1": [a, b, "1"], "C2": [b, c, "1"], "W1": [c, a, "1"], "W2": [a, c, "1"] },
                "evaluations": { "ql": a, "qr": b, "qm": c, "qo": a, "qc": b },
                "protocol": "fflonk",
                "curve": "bn128",
                "binding": binding,
            }),
        }
    }

    async fn write_proof(
        system: ProvingSystem,
        zkey: &Path,
        signals: &[String],
        proof_out: &Path,
        public_out: &Path,
    ) -> Result<(), BackendError> {
        let zkey_bytes = fs::read(zkey).await?;
        let zkey_digest = sha256_hex(&[&zkey_bytes]);
        let publics = serde_json::to_string(&signals)?;
        let binding = sha256_hex(&[zkey_digest.as_bytes(), publics.as_bytes()]);
        let proof = Self::proof_payload(system, &binding);
        fs::write(proof_out, serde_json::to_vec_pretty(&proof)?).await?;
        fs::write(public_out, publics).await?;
        Ok(())
    }
}

#[async_trait]
impl ProvingBackend for MockBackend {
    async fn compute_witness(
        &self,
        wasm: &Path,
        input_json: &Path,
        wtns_out: &Path,
    ) -> Result<(), BackendError> {
        CallCounts::bump(&self.counts.witness);
        self.injected_failure("witness")?;
        let wasm_bytes = fs::read(wasm).await?;
        let input: Value = serde_json::from_slice(&fs::read(input_json).await?)?;
        let mut signals = Vec::new();
        flatten_signals(&input, &mut signals);
        let witness = json!({
            "signals": signals,
            "calculator_sha256": sha256_hex(&[&wasm_bytes]),
        });
        fs::write(wtns_out, serde_json::to_vec(&witness)?).await?;
        Ok(())
    }

    async fn setup_key(
        &self,
        system: ProvingSystem,
        r1cs: &Path,
        ptau: &Path,
        zkey_out: &Path,
    ) -> Result<(), BackendError> {
        CallCounts::bump(&self.counts.setup);
        self.injected_failure("setup")?;
        let r1cs_bytes = fs::read(r1cs).await?;
        let ptau_bytes = fs::read(ptau).await?;
        let phase = if system.requires_contribution() {
            "intermediate"
        } else {
            "final"
        };
        let zkey = json!({
            "system": system.as_str(),
            "r1cs_sha256": sha256_hex(&[&r1cs_bytes]),
            "setup_sha256": sha256_hex(&[&ptau_bytes]),
            "phase": phase,
        });
        fs::write(zkey_out, serde_json::to_vec(&zkey)?).await?;
        Ok(())
    }

    async fn contribute(
        &self,
        zkey_in: &Path,
        zkey_out: &Path,
        entropy: &str,
    ) -> Result<(), BackendError> {
        CallCounts::bump(&self.counts.contribute);
        self.injected_failure("contribute")?;
        let mut zkey: Value = serde_json::from_slice(&fs::read(zkey_in).await?)?;
        if let Some(obj) = zkey.as_object_mut() {
            obj.insert("phase".into(), json!("final"));
            obj.insert(
                "contribution_sha256".into(),
                json!(sha256_hex(&[entropy.as_bytes()])),
            );
        }
        fs::write(zkey_out, serde_json::to_vec(&zkey)?).await?;
        Ok(())
    }

    async fn export_verification_key(
        &self,
        zkey: &Path,
        vkey_out: &Path,
    ) -> Result<(), BackendError> {
        CallCounts::bump(&self.counts.export_vkey);
        self.injected_failure("export_vkey")?;
        let zkey_bytes = fs::read(zkey).await?;
        let parsed: Value = serde_json::from_slice(&zkey_bytes)?;
        let protocol = parsed
            .get("system")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let vkey = json!({
            "protocol": protocol,
            "zkey_sha256": sha256_hex(&[&zkey_bytes]),
        });
        fs::write(vkey_out, serde_json::to_vec(&vkey)?).await?;
        Ok(())
    }

    async fn prove(
        &self,
        system: ProvingSystem,
        zkey: &Path,
        wtns: &Path,
        proof_out: &Path,
        public_out: &Path,
    ) -> Result<(), BackendError> {
        CallCounts::bump(&self.counts.prove);
        self.injected_failure("prove")?;
        let witness: Value = serde_json::from_slice(&fs::read(wtns).await?)?;
        let signals: Vec<String> = witness
            .get("signals")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self::write_proof(system, zkey, &signals, proof_out, public_out).await
    }

    async fn full_prove(
        &self,
        system: ProvingSystem,
        input_json: &Path,
        wasm: &Path,
        zkey: &Path,
        proof_out: &Path,
        public_out: &Path,
    ) -> Result<(), BackendError> {
        CallCounts::bump(&self.counts.full_prove);
        self.injected_failure("full_prove")?;
        // The calculator must exist even though the mock ignores its logic.
        let _ = fs::metadata(wasm).await?;
        let input: Value = serde_json::from_slice(&fs::read(input_json).await?)?;
        let mut signals = Vec::new();
        flatten_signals(&input, &mut signals);
        Self::write_proof(system, zkey, &signals, proof_out, public_out).await
    }

    async fn verify(
        &self,
        system: ProvingSystem,
        vkey: &Path,
        public_json: &Path,
        proof_json: &Path,
    ) -> Result<bool, BackendError> {
        CallCounts::bump(&self.counts.verify);
        self.injected_failure("verify")?;
        let vkey: Value = serde_json::from_slice(&fs::read(vkey).await?)?;
        let proof: Value = serde_json::from_slice(&fs::read(proof_json).await?)?;
        let publics: Vec<String> = serde_json::from_slice(&fs::read(public_json).await?)?;

        let Some(zkey_digest) = vkey.get("zkey_sha256").and_then(Value::as_str) else {
            return Ok(false);
        };
        if proof.get("protocol").and_then(Value::as_str) != Some(system.as_str()) {
            return Ok(false);
        }
        let canonical = serde_json::to_string(&publics)?;
        let expected = sha256_hex(&[zkey_digest.as_bytes(), canonical.as_bytes()]);
        Ok(proof.get("binding").and_then(Value::as_str) == Some(expected.as_str()))
    }

    async fn export_verifier_contract(
        &self,
        zkey: &Path,
        contract_out: &Path,
    ) -> Result<(), BackendError> {
        CallCounts::bump(&self.counts.contract);
        self.injected_failure("contract")?;
        let zkey_bytes = fs::read(zkey).await?;
        let contract = format!(
            "// mock verifier contract\n// proving key sha256: {}\n",
            sha256_hex(&[&zkey_bytes])
        );
        fs::write(contract_out, contract).await?;
        Ok(())
    }
}
