//! # zkpipe CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;
use std::path::PathBuf;

/// zkpipe — circuit-to-proof pipeline toolchain.
///
/// Compiles zero-knowledge circuits, manages key ceremonies with
/// staleness-aware caching, generates and verifies proofs, and serves
/// the HTTP API.
#[derive(Parser, Debug)]
#[command(name = "zkpipe", version, about)]
struct Cli {
    /// Pipeline configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root override.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Compile a circuit source file.
    Compile(zkpipe_cli::compile::CompileArgs),
    /// Derive or reuse key material for a compiled circuit.
    Setup(zkpipe_cli::setup::SetupArgs),
    /// Generate a proof from an input assignment.
    Prove(zkpipe_cli::prove::ProveArgs),
    /// Verify a proof against a stored verification key.
    Verify(zkpipe_cli::verify::VerifyArgs),
    /// Run the full compile-to-ledger lifecycle.
    Complete(zkpipe_cli::complete::CompleteArgs),
    /// Export a verifier-contract artifact.
    ExportVerifier(zkpipe_cli::export_verifier::ExportVerifierArgs),
    /// Serve the HTTP API.
    Serve(zkpipe_cli::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = zkpipe_cli::context::build(cli.config.as_deref(), cli.workspace)?;

    match cli.command {
        Commands::Compile(args) => zkpipe_cli::compile::run(&ctx, args).await,
        Commands::Setup(args) => zkpipe_cli::setup::run(&ctx, args).await,
        Commands::Prove(args) => zkpipe_cli::prove::run(&ctx, args).await,
        Commands::Verify(args) => zkpipe_cli::verify::run(&ctx, args).await,
        Commands::Complete(args) => zkpipe_cli::complete::run(&ctx, args).await,
        Commands::ExportVerifier(args) => zkpipe_cli::export_verifier::run(&ctx, args).await,
        Commands::Serve(args) => zkpipe_cli::serve::run(&ctx, args).await,
    }
}
