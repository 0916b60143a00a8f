//! # `zkpipe compile`
//!
//! Compiles a circuit source file into the workspace and prints the
//! derived statistics.

use anyhow::Context as _;
use clap::Args;
use std::path::PathBuf;

use zkpipe_compiler::{CircuitSource, CompileOptions, FieldPrime, OptLevel};
use zkpipe_core::CircuitName;

use crate::context::CliContext;

/// Arguments for the compile subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Circuit source file (`.circom`).
    pub file: PathBuf,

    /// Circuit name; defaults to the file stem.
    #[arg(long)]
    pub name: Option<String>,

    /// Constraint-simplification level (o0, o1, o2).
    #[arg(long, default_value = "o1")]
    pub opt: String,

    /// Field prime (bn128, bls12381, goldilocks).
    #[arg(long, default_value = "bn128")]
    pub prime: String,

    /// Also emit the native C witness calculator.
    #[arg(long)]
    pub emit_c: bool,
}

fn parse_opt(raw: &str) -> anyhow::Result<OptLevel> {
    match raw.to_ascii_lowercase().as_str() {
        "o0" => Ok(OptLevel::O0),
        "o1" => Ok(OptLevel::O1),
        "o2" => Ok(OptLevel::O2),
        other => anyhow::bail!("unknown optimization level {other:?} (expected o0, o1, or o2)"),
    }
}

fn parse_prime(raw: &str) -> anyhow::Result<FieldPrime> {
    match raw.to_ascii_lowercase().as_str() {
        "bn128" => Ok(FieldPrime::Bn128),
        "bls12381" => Ok(FieldPrime::Bls12381),
        "goldilocks" => Ok(FieldPrime::Goldilocks),
        other => anyhow::bail!(
            "unknown field prime {other:?} (expected bn128, bls12381, or goldilocks)"
        ),
    }
}

/// Resolve the circuit name from the flag or the file stem.
pub fn resolve_name(file: &std::path::Path, name: Option<&str>) -> anyhow::Result<CircuitName> {
    let raw = match name {
        Some(name) => name.to_string(),
        None => file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .with_context(|| format!("cannot derive a circuit name from {}", file.display()))?,
    };
    Ok(CircuitName::new(&raw)?)
}

/// Run the compile subcommand.
pub async fn run(ctx: &CliContext, args: CompileArgs) -> anyhow::Result<()> {
    let name = resolve_name(&args.file, args.name.as_deref())?;
    let source = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let options = CompileOptions {
        emit_c: args.emit_c,
        opt_level: parse_opt(&args.opt)?,
        prime: parse_prime(&args.prime)?,
        ..CompileOptions::default()
    };

    let set = ctx
        .pipeline
        .compile(&CircuitSource {
            name,
            source,
            options,
        })
        .await?;

    println!("compiled {}", set.name);
    println!(
        "  constraints: {} ({} non-linear, {} linear)",
        set.stats.constraints(),
        set.stats.non_linear_constraints,
        set.stats.linear_constraints
    );
    println!("  wires: {}", set.stats.wires);
    println!(
        "  inputs: {} public, {} private; outputs: {}",
        set.stats.public_inputs, set.stats.private_inputs, set.stats.public_outputs
    );
    println!("  constraint system: {}", set.r1cs.display());
    println!("  witness calculator: {}", set.wasm.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn name_defaults_to_file_stem() {
        let name = resolve_name(Path::new("/tmp/Multiplier2.circom"), None).unwrap();
        assert_eq!(name.as_str(), "Multiplier2");
        let name = resolve_name(Path::new("x.circom"), Some("Override")).unwrap();
        assert_eq!(name.as_str(), "Override");
    }

    #[test]
    fn option_parsers_cover_the_tool_surface() {
        assert_eq!(parse_opt("O2").unwrap(), OptLevel::O2);
        assert!(parse_opt("o3").is_err());
        assert_eq!(parse_prime("bn128").unwrap(), FieldPrime::Bn128);
        assert!(parse_prime("secp256k1").is_err());
    }
}
