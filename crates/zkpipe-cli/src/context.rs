//! # CLI Context
//!
//! Builds the pipeline orchestrator from the deployment configuration:
//! YAML config file (when given), environment overrides for tool paths,
//! and an optional workspace-root override from the command line.

use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use zkpipe_backend::SnarkjsBackend;
use zkpipe_core::{CircuitName, PipelineConfig, ProvingSystem};
use zkpipe_pipeline::{HttpLedgerClient, Pipeline};

/// Shared state for all subcommand handlers.
pub struct CliContext {
    /// The loaded deployment configuration.
    pub config: PipelineConfig,
    /// The assembled pipeline.
    pub pipeline: Arc<Pipeline>,
}

/// Build the CLI context.
///
/// Without a config file, defaults apply: `./workspace` as root and the
/// tools resolved from `PATH` (or the `ZKPIPE_*_BIN` overrides).
pub fn build(config_path: Option<&Path>, workspace_root: Option<PathBuf>) -> anyhow::Result<CliContext> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = workspace_root {
        config.workspace_root = Some(root);
    }

    let workspace = config.workspace();
    workspace
        .ensure_layout()
        .with_context(|| format!("creating workspace at {}", workspace.root.display()))?;

    let toolchain = config.toolchain();
    let backend = Arc::new(SnarkjsBackend::new(&toolchain.snarkjs_bin));
    let mut pipeline = Pipeline::new(
        workspace,
        toolchain,
        &config.setup,
        &config.limits,
        backend,
    );
    if let Some(ledger_config) = &config.ledger {
        let ledger = HttpLedgerClient::new(ledger_config)
            .context("constructing ledger client")?;
        pipeline = pipeline.with_ledger(Arc::new(ledger));
        tracing::info!(endpoint = %ledger_config.endpoint, "ledger submission enabled");
    }

    Ok(CliContext {
        config,
        pipeline: Arc::new(pipeline),
    })
}

/// Parse a circuit name argument.
pub fn parse_circuit(raw: &str) -> Result<CircuitName, zkpipe_core::CoreError> {
    CircuitName::new(raw)
}

/// Parse a proving-system argument (`groth16`, `plonk`, `fflonk`).
pub fn parse_system(raw: &str) -> Result<ProvingSystem, zkpipe_core::CoreError> {
    raw.parse()
}

/// Read a JSON input-assignment file.
pub async fn read_assignment(path: &Path) -> anyhow::Result<zkpipe_prover::WitnessAssignment> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading inputs {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing inputs {}", path.display()))?;
    Ok(zkpipe_prover::WitnessAssignment::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn build_creates_workspace_layout() {
        let tmp = TempDir::new().unwrap();
        let ctx = build(None, Some(tmp.path().join("ws"))).unwrap();
        assert!(ctx.pipeline.workspace().src_dir().is_dir());
        assert!(!ctx.pipeline.has_ledger());
    }

    #[test]
    fn build_wires_ledger_from_config() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("zkpipe.yaml");
        std::fs::write(
            &config_path,
            format!(
                "workspace_root: {}\nledger:\n  endpoint: http://127.0.0.1:9999\n",
                tmp.path().join("ws").display()
            ),
        )
        .unwrap();
        let ctx = build(Some(&config_path), None).unwrap();
        assert!(ctx.pipeline.has_ledger());
    }

    #[test]
    fn argument_parsers_reject_bad_input() {
        assert!(parse_circuit("Multiplier2").is_ok());
        assert!(parse_circuit("../escape").is_err());
        assert!(parse_system("plonk").is_ok());
        assert!(parse_system("stark").is_err());
    }
}
