//! End-to-end round trip against the real external tools. Ignored by
//! default: requires `circom` and `snarkjs` on `PATH` (override with
//! `ZKPIPE_CIRCOM_BIN` / `ZKPIPE_SNARKJS_BIN`) and network access for
//! the one-time universal setup fetch.
//!
//! Run with: `cargo test -p zkpipe-pipeline -- --ignored`

use std::sync::Arc;

use tempfile::TempDir;
use zkpipe_backend::SnarkjsBackend;
use zkpipe_compiler::{CircuitSource, CompileOptions};
use zkpipe_core::config::{LimitsConfig, SetupConfig};
use zkpipe_core::{CircuitName, ProvingSystem, ToolchainConfig, WorkspaceConfig};
use zkpipe_pipeline::{CompleteRequest, Pipeline};
use zkpipe_prover::WitnessAssignment;

const MULTIPLIER2: &str = r#"
pragma circom 2.1.6;

template Multiplier2() {
    signal input a;
    signal input b;
    signal output c;
    c <== a * b;
}

component main = Multiplier2();
"#;

const ADDER2: &str = r#"
pragma circom 2.1.6;

template Adder2() {
    signal input a;
    signal input b;
    signal output c;
    c <== a + b;
}

component main = Adder2();
"#;

fn real_pipeline(tmp: &TempDir) -> Pipeline {
    let workspace = WorkspaceConfig::new(tmp.path().join("ws"));
    workspace.ensure_layout().unwrap();
    let toolchain = ToolchainConfig::default().with_env_overrides();
    let backend = Arc::new(SnarkjsBackend::new(&toolchain.snarkjs_bin));
    Pipeline::new(
        workspace,
        toolchain,
        &SetupConfig::default(),
        &LimitsConfig::default(),
        backend,
    )
}

fn source(name: &str, text: &str) -> CircuitSource {
    CircuitSource {
        name: CircuitName::new(name).unwrap(),
        source: text.to_string(),
        options: CompileOptions::default(),
    }
}

fn inputs() -> WitnessAssignment {
    let mut assignment = WitnessAssignment::new();
    assignment.set("a", 3).set("b", 4);
    assignment
}

#[tokio::test]
#[ignore = "requires circom and snarkjs on PATH"]
async fn multiplier2_round_trips_with_real_tools() {
    let tmp = TempDir::new().unwrap();
    let pipeline = real_pipeline(&tmp);

    let report = pipeline
        .complete(&CompleteRequest {
            source: source("Multiplier2", MULTIPLIER2),
            system: ProvingSystem::Groth16,
            assignment: inputs(),
            task_id: None,
            user_id: None,
            metadata: serde_json::Value::Null,
        })
        .await
        .unwrap();

    // c <== a*b with {a:3, b:4}: the witness carries c = 12 and the
    // public signals disclose it.
    assert!(report.verification.verified);
    assert!(report.proof.public_signals.contains(&"12".to_string()));
    assert_eq!(report.stats.constraints(), 1);
}

#[tokio::test]
#[ignore = "requires circom and snarkjs on PATH"]
async fn foreign_verification_key_rejects_the_proof() {
    let tmp = TempDir::new().unwrap();
    let pipeline = real_pipeline(&tmp);

    let multiplier = CircuitName::new("Multiplier2").unwrap();
    let adder = CircuitName::new("Adder2").unwrap();

    pipeline.compile(&source("Multiplier2", MULTIPLIER2)).await.unwrap();
    pipeline.compile(&source("Adder2", ADDER2)).await.unwrap();
    pipeline.setup(&multiplier, ProvingSystem::Groth16).await.unwrap();
    pipeline.setup(&adder, ProvingSystem::Groth16).await.unwrap();

    let proof = pipeline
        .prove(&multiplier, ProvingSystem::Groth16, &inputs())
        .await
        .unwrap();

    let own = pipeline.verify(&multiplier, &proof).await.unwrap();
    assert!(own.verified);

    // The adder's exported key comes from a different circuit; the
    // proof must not verify against it.
    let foreign = pipeline.verify(&adder, &proof).await.unwrap();
    assert!(!foreign.verified);
}
