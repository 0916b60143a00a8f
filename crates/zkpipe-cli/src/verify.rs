//! # `zkpipe verify`
//!
//! Verifies a proof document against a circuit's stored verification
//! key. Exits non-zero when the proof is rejected.

use anyhow::Context as _;
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;

use zkpipe_core::ProvingSystem;
use zkpipe_prover::Proof;

use crate::context::{parse_circuit, parse_system, CliContext};

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Circuit name whose exported verification key to use.
    #[arg(value_parser = parse_circuit)]
    pub circuit: zkpipe_core::CircuitName,

    /// Proving system the proof claims (groth16, plonk, fflonk).
    #[arg(long, value_parser = parse_system, default_value = "groth16")]
    pub system: ProvingSystem,

    /// Proof document as written by `zkpipe prove --output`.
    #[arg(long)]
    pub proof: PathBuf,
}

/// On-disk shape of a proof document.
#[derive(Deserialize)]
struct ProofDocument {
    proof: serde_json::Value,
    public_signals: Vec<String>,
}

/// Run the verify subcommand.
pub async fn run(ctx: &CliContext, args: VerifyArgs) -> anyhow::Result<()> {
    let raw = tokio::fs::read(&args.proof)
        .await
        .with_context(|| format!("reading {}", args.proof.display()))?;
    let document: ProofDocument = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing {}", args.proof.display()))?;

    let proof = Proof {
        system: args.system,
        payload: document.proof,
        public_signals: document.public_signals,
        duration_ms: 0,
    };
    let result = ctx.pipeline.verify(&args.circuit, &proof).await?;
    if result.verified {
        println!("verified: true ({} ms)", result.duration_ms);
        Ok(())
    } else {
        println!("verified: false ({} ms)", result.duration_ms);
        if let Some(diagnostic) = result.diagnostic {
            println!("  {diagnostic}");
        }
        anyhow::bail!("proof did not verify")
    }
}
