//! # `zkpipe prove`
//!
//! Generates a proof for a compiled circuit from a JSON input
//! assignment, regenerating stale key material first.

use anyhow::Context as _;
use clap::Args;
use std::path::PathBuf;

use zkpipe_core::ProvingSystem;

use crate::context::{parse_circuit, parse_system, read_assignment, CliContext};

/// Arguments for the prove subcommand.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Circuit name (must be compiled already).
    #[arg(value_parser = parse_circuit)]
    pub circuit: zkpipe_core::CircuitName,

    /// Proving system (groth16, plonk, fflonk).
    #[arg(long, value_parser = parse_system, default_value = "groth16")]
    pub system: ProvingSystem,

    /// JSON file with the named input values.
    #[arg(long)]
    pub inputs: PathBuf,

    /// Write the proof document (payload + public signals) here instead
    /// of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Run the prove subcommand.
pub async fn run(ctx: &CliContext, args: ProveArgs) -> anyhow::Result<()> {
    let assignment = read_assignment(&args.inputs).await?;
    let proof = ctx
        .pipeline
        .prove(&args.circuit, args.system, &assignment)
        .await?;

    let document = serde_json::json!({
        "system": proof.system,
        "proof": proof.payload,
        "public_signals": proof.public_signals,
        "duration_ms": proof.duration_ms,
    });
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, serde_json::to_vec_pretty(&document)?)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "proof for {} written to {} ({} ms)",
                args.circuit,
                path.display(),
                proof.duration_ms
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&document)?),
    }
    Ok(())
}
