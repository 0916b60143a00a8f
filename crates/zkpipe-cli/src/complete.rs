//! # `zkpipe complete`
//!
//! Runs the full lifecycle for one circuit: compile, key material,
//! prove, verify, and ledger submission when an endpoint is configured.

use anyhow::Context as _;
use clap::Args;
use std::path::PathBuf;
use uuid::Uuid;

use zkpipe_compiler::{CircuitSource, CompileOptions};
use zkpipe_core::ProvingSystem;
use zkpipe_pipeline::CompleteRequest;

use crate::compile::resolve_name;
use crate::context::{parse_system, read_assignment, CliContext};

/// Arguments for the complete subcommand.
#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Circuit source file (`.circom`).
    pub file: PathBuf,

    /// Circuit name; defaults to the file stem.
    #[arg(long)]
    pub name: Option<String>,

    /// Proving system (groth16, plonk, fflonk).
    #[arg(long, value_parser = parse_system, default_value = "groth16")]
    pub system: ProvingSystem,

    /// JSON file with the named input values.
    #[arg(long)]
    pub inputs: PathBuf,

    /// Submitting user recorded on the ledger.
    #[arg(long)]
    pub user: Option<String>,

    /// Task identifier recorded on the ledger; generated when absent.
    #[arg(long)]
    pub task: Option<Uuid>,
}

/// Run the complete subcommand.
pub async fn run(ctx: &CliContext, args: CompleteArgs) -> anyhow::Result<()> {
    let name = resolve_name(&args.file, args.name.as_deref())?;
    let source = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let assignment = read_assignment(&args.inputs).await?;

    let report = ctx
        .pipeline
        .complete(&CompleteRequest {
            source: CircuitSource {
                name,
                source,
                options: CompileOptions::default(),
            },
            system: args.system,
            assignment,
            task_id: args.task,
            user_id: args.user,
            metadata: serde_json::json!({"origin": "zkpipe-cli"}),
        })
        .await?;

    println!("pipeline finished for {} ({})", report.circuit, report.system);
    println!("  constraints: {}", report.stats.constraints());
    println!("  public signals: {:?}", report.proof.public_signals);
    println!("  proof hash: {}", report.proof_hash);
    println!("  verified: {}", report.verification.verified);
    match &report.submission {
        Some(receipt) => println!("  ledger transaction: {}", receipt.transaction_id),
        None if ctx.pipeline.has_ledger() => println!("  ledger: skipped (proof rejected)"),
        None => println!("  ledger: not configured"),
    }
    if !report.verification.verified {
        anyhow::bail!("proof did not verify")
    }
    Ok(())
}
