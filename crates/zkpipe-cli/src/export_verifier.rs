//! # `zkpipe export-verifier`
//!
//! Exports a verifier-contract artifact from a circuit's proving key.
//! Utility only — nothing in the verification flow consumes it.

use clap::Args;
use std::path::PathBuf;

use zkpipe_core::ProvingSystem;

use crate::context::{parse_circuit, parse_system, CliContext};

/// Arguments for the export-verifier subcommand.
#[derive(Args, Debug)]
pub struct ExportVerifierArgs {
    /// Circuit name (key material must exist already).
    #[arg(value_parser = parse_circuit)]
    pub circuit: zkpipe_core::CircuitName,

    /// Proving system the key belongs to (groth16, plonk, fflonk).
    #[arg(long, value_parser = parse_system, default_value = "groth16")]
    pub system: ProvingSystem,

    /// Where to write the contract source.
    #[arg(long)]
    pub output: PathBuf,
}

/// Run the export-verifier subcommand.
pub async fn run(ctx: &CliContext, args: ExportVerifierArgs) -> anyhow::Result<()> {
    ctx.pipeline
        .export_verifier_contract(&args.circuit, args.system, &args.output)
        .await?;
    println!(
        "verifier contract for {} written to {}",
        args.circuit,
        args.output.display()
    );
    Ok(())
}
