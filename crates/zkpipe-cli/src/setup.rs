//! # `zkpipe setup`
//!
//! Derives (or reuses) proving and verification keys for a compiled
//! circuit.

use clap::Args;

use zkpipe_core::ProvingSystem;

use crate::context::{parse_circuit, parse_system, CliContext};

/// Arguments for the setup subcommand.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Circuit name (must be compiled already).
    #[arg(value_parser = parse_circuit)]
    pub circuit: zkpipe_core::CircuitName,

    /// Proving system (groth16, plonk, fflonk).
    #[arg(long, value_parser = parse_system, default_value = "groth16")]
    pub system: ProvingSystem,
}

/// Run the setup subcommand.
pub async fn run(ctx: &CliContext, args: SetupArgs) -> anyhow::Result<()> {
    let keys = ctx.pipeline.setup(&args.circuit, args.system).await?;
    println!("key material ready for {} ({})", args.circuit, args.system);
    println!("  proving key: {}", keys.proving_key.display());
    println!("  verification key: {}", keys.verification_key.display());
    Ok(())
}
